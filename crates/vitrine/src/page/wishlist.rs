//! Customer wishlist page.

use serde::Serialize;

use super::{BasePage, PageObject};
use crate::config::PageKind;
use crate::locator::{Locator, Selector};
use crate::result::VitrineResult;

const WISHLIST_ITEMS: Locator = Locator::new(
    "wishlist items",
    &[Selector::css(".wishlist__item"), Selector::css(".wishlist-item")],
);
const ITEM_NAME: Locator = Locator::new(
    "item name",
    &[
        Selector::css(".wishlist__item-title"),
        Selector::css(".product__title"),
        Selector::css("h3"),
    ],
);
const ITEM_PRICE: Locator = Locator::new(
    "item price",
    &[
        Selector::css(".wishlist__item-price"),
        Selector::css(".product__price"),
        Selector::css(".price"),
    ],
);
const ITEM_IMAGE: Locator = Locator::new(
    "item image",
    &[Selector::css(".wishlist__item-image img"), Selector::css(".product__image img")],
);
const ITEM_LINK: Locator = Locator::new(
    "item link",
    &[Selector::css(".wishlist__item-link"), Selector::css(".product__link"), Selector::css("a")],
);
const ADD_TO_CART_BUTTONS: Locator = Locator::new(
    "add to cart",
    &[
        Selector::css(".add-to-cart"),
        Selector::css(".btn--add-to-cart"),
        Selector::css("button[name*='add']"),
    ],
);
const REMOVE_BUTTONS: Locator = Locator::new(
    "remove from wishlist",
    &[
        Selector::css(".remove-wishlist"),
        Selector::css(".wishlist__remove"),
        Selector::css("button[name*='remove']"),
    ],
);
const MOVE_TO_CART_BUTTONS: Locator = Locator::new(
    "move to cart",
    &[Selector::css(".move-to-cart"), Selector::css(".wishlist__move")],
);
const EMPTY_MESSAGE: Locator = Locator::new(
    "empty wishlist message",
    &[
        Selector::css(".wishlist--empty"),
        Selector::css(".empty-wishlist"),
        Selector::css(".wishlist__empty"),
    ],
);
const CONTINUE_SHOPPING: Locator = Locator::new(
    "continue shopping",
    &[Selector::css(".continue-shopping"), Selector::css(".wishlist__continue")],
);
const SHARE_BUTTON: Locator = Locator::new(
    "share wishlist",
    &[Selector::css(".share-wishlist"), Selector::css(".wishlist__share")],
);
const CLEAR_BUTTON: Locator = Locator::new(
    "clear wishlist",
    &[Selector::css(".clear-wishlist"), Selector::css(".wishlist__clear")],
);
const WISHLIST_COUNT: Locator = Locator::new(
    "wishlist count",
    &[Selector::css(".wishlist-count"), Selector::css(".wishlist__count")],
);
const SORT_DROPDOWN: Locator = Locator::new(
    "sort",
    &[Selector::css("select[name*='sort']"), Selector::css("select.sort-dropdown")],
);
const PAGE_TITLE: Locator = Locator::new(
    "wishlist title",
    &[Selector::css(".wishlist-title"), Selector::css(".page-title"), Selector::css("h1")],
);

/// One saved product
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WishlistItem {
    pub name: String,
    pub price: String,
    /// Product page `href`
    pub link: String,
    pub image_src: String,
}

/// Saved products
#[derive(Debug, Clone, Copy)]
pub struct WishlistPage<'s> {
    base: BasePage<'s>,
}

impl<'s> PageObject<'s> for WishlistPage<'s> {
    const KIND: PageKind = PageKind::Wishlist;

    fn from_base(base: BasePage<'s>) -> Self {
        Self { base }
    }

    fn base(&self) -> &BasePage<'s> {
        &self.base
    }

    fn is_loaded(&self) -> VitrineResult<bool> {
        Ok(self.base.url_contains("wishlist")?
            || self.base.is_present(&WISHLIST_ITEMS)?
            || self.base.is_present(&EMPTY_MESSAGE)?)
    }
}

impl WishlistPage<'_> {
    pub fn is_wishlist_empty(&self) -> VitrineResult<bool> {
        let probe = self.base.within(self.base.settings().timeouts().probe());
        Ok(probe.is_visible(&EMPTY_MESSAGE)? || self.base.count(&WISHLIST_ITEMS)? == 0)
    }

    pub fn empty_message(&self) -> VitrineResult<String> {
        self.base
            .within(self.base.settings().timeouts().probe())
            .text(&EMPTY_MESSAGE)
    }

    /// Saved products with a readable name
    pub fn wishlist_items(&self) -> VitrineResult<Vec<WishlistItem>> {
        let rows = self
            .base
            .within(self.base.settings().timeouts().probe())
            .find_all(&WISHLIST_ITEMS)?;
        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            let name = self.base.text_within(row, &ITEM_NAME)?;
            if name.is_empty() {
                tracing::warn!(row = %row, "could not read wishlist item");
                continue;
            }
            items.push(WishlistItem {
                name,
                price: self.base.text_within(row, &ITEM_PRICE)?,
                link: self.base.attribute_within(row, &ITEM_LINK, "href")?,
                image_src: self.base.attribute_within(row, &ITEM_IMAGE, "src")?,
            });
        }
        Ok(items)
    }

    pub fn item_count(&self) -> VitrineResult<usize> {
        self.base.count(&WISHLIST_ITEMS)
    }

    /// Header counter as displayed
    pub fn count_display(&self) -> VitrineResult<String> {
        self.base.text(&WISHLIST_COUNT)
    }

    pub fn page_title(&self) -> VitrineResult<String> {
        self.base.text(&PAGE_TITLE)
    }

    pub fn remove_item(&self, index: usize) -> VitrineResult<bool> {
        self.click_and_settle(&REMOVE_BUTTONS, index)
    }

    pub fn add_item_to_cart(&self, index: usize) -> VitrineResult<bool> {
        self.click_and_settle(&ADD_TO_CART_BUTTONS, index)
    }

    pub fn move_item_to_cart(&self, index: usize) -> VitrineResult<bool> {
        self.click_and_settle(&MOVE_TO_CART_BUTTONS, index)
    }

    fn click_and_settle(&self, control: &Locator, index: usize) -> VitrineResult<bool> {
        if self.base.click_nth(control, index)? {
            self.base.wait_for_page_load()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Open the product page of item `index`
    pub fn click_product(&self, index: usize) -> VitrineResult<bool> {
        let Some(row) = self.base.find_all(&WISHLIST_ITEMS)?.into_iter().nth(index) else {
            tracing::warn!(index, "no wishlist item at index");
            return Ok(false);
        };
        if self.base.click_within(&row, &ITEM_LINK)? {
            self.base.wait_for_page_load()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Press the clear control; `false` when the page has none
    pub fn clear_wishlist(&self) -> VitrineResult<bool> {
        if !self.base.is_present(&CLEAR_BUTTON)? {
            return Ok(false);
        }
        if self.base.click(&CLEAR_BUTTON)? {
            self.base.wait_for_page_load()?;
            return Ok(true);
        }
        Ok(false)
    }

    pub fn share_wishlist(&self) -> VitrineResult<bool> {
        self.base.click(&SHARE_BUTTON)
    }

    pub fn continue_shopping(&self) -> VitrineResult<bool> {
        if self.base.click(&CONTINUE_SHOPPING)? {
            self.base.wait_for_page_load()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Pick a sort order by its visible label
    pub fn sort_by(&self, option: &str) -> VitrineResult<bool> {
        if !self.base.is_present(&SORT_DROPDOWN)? {
            return Ok(false);
        }
        if self.base.select_by_text(&SORT_DROPDOWN, option)? {
            self.base.wait_for_page_load()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Add every saved product to the cart; `true` when each add succeeded
    ///
    /// Rows that leave the list after being added are not skipped over: the
    /// next add targets the same index.
    pub fn add_all_to_cart(&self) -> VitrineResult<bool> {
        let total = self.item_count()?;
        let mut index = 0;
        let mut added = 0;
        for _ in 0..total {
            let before = self.item_count()?;
            if self.add_item_to_cart(index)? {
                added += 1;
                if self.item_count()? >= before {
                    index += 1;
                }
            } else {
                index += 1;
            }
        }
        tracing::info!(added, total, "added wishlist to cart");
        Ok(added == total)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::{Settings, Timeouts};
    use crate::fixture::{Effect, El, FixtureDocument, FixtureSession, FixtureSite};
    use crate::session::Session;

    fn settings() -> Settings {
        Settings::default()
            .with_base_url("https://shop.test/")
            .with_timeouts(Timeouts::uniform(100, 10))
    }

    fn row(n: usize, moves_to_cart: bool) -> El {
        El::div("wishlist-item")
            .id(&format!("saved-{n}"))
            .child(El::new("h3").text(&format!("Saved {n}")))
            .child(El::div("price").text("Ksh 1,500"))
            .child(El::link(&format!("/products/saved-{n}"), "View"))
            .child(El::button("Add to cart").class("add-to-cart").id(&format!("add-{n}")))
            .child(if moves_to_cart {
                El::button("Move").class("move-to-cart").id(&format!("move-{n}"))
            } else {
                El::div("spacer")
            })
    }

    fn session() -> FixtureSession {
        let doc = FixtureDocument::new("Wishlist")
            .with(El::new("h1").text("My wishlist"))
            .with(row(0, true))
            .with(row(1, false))
            .with(row(2, false))
            .on_click("move-0", |_, _, ()| vec![Effect::Remove("saved-0".into())]);
        let site = FixtureSite::new("https://shop.test")
            .static_page("/account/wishlist", doc)
            .static_page("/products/saved-1", FixtureDocument::new("Saved 1"));
        FixtureSession::open(site, (), "/account/wishlist")
    }

    #[test]
    fn test_items_read_per_row() {
        let s = session();
        let cfg = settings();
        let page = WishlistPage::new(&s, &cfg);
        assert!(page.is_loaded().unwrap());
        assert!(!page.is_wishlist_empty().unwrap());
        let items = page.wishlist_items().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[2].name, "Saved 2");
        assert_eq!(items[2].link, "/products/saved-2");
        assert_eq!(page.page_title().unwrap(), "My wishlist");
    }

    #[test]
    fn test_move_to_cart_removes_row() {
        let s = session();
        let cfg = settings();
        let page = WishlistPage::new(&s, &cfg);
        assert!(page.move_item_to_cart(0).unwrap());
        assert_eq!(page.item_count().unwrap(), 2);
        assert!(!page.move_item_to_cart(1).unwrap());
    }

    #[test]
    fn test_add_all_walks_rows_that_stay() {
        let s = session();
        let cfg = settings();
        let page = WishlistPage::new(&s, &cfg);
        assert!(page.add_all_to_cart().unwrap());
        let clicks: Vec<String> = s
            .action_log()
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.starts_with("click"))
            .cloned()
            .collect();
        assert_eq!(clicks.len(), 3);
    }

    #[test]
    fn test_click_product_follows_row_link() {
        let s = session();
        let cfg = settings();
        let page = WishlistPage::new(&s, &cfg);
        assert!(page.click_product(1).unwrap());
        assert_eq!(s.title().unwrap(), "Saved 1");
    }

    #[test]
    fn test_empty_and_missing_controls() {
        let doc = FixtureDocument::new("Wishlist").with(El::div("empty-wishlist").text("Nothing saved yet"));
        let s = FixtureSession::open(
            FixtureSite::new("https://shop.test").static_page("/account/wishlist", doc),
            (),
            "/account/wishlist",
        );
        let cfg = settings();
        let page = WishlistPage::new(&s, &cfg);
        assert!(page.is_wishlist_empty().unwrap());
        assert_eq!(page.empty_message().unwrap(), "Nothing saved yet");
        assert!(!page.clear_wishlist().unwrap());
        assert!(!page.sort_by("Price").unwrap());
        assert!(page.add_all_to_cart().unwrap());
    }
}
