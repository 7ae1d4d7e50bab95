//! Product detail page.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::home::ProductCard;
use super::{probe_outcome, BasePage, PageObject};
use crate::config::PageKind;
use crate::locator::{Locator, Selector};
use crate::outcome::Outcome;
use crate::result::{VitrineError, VitrineResult};

const PRODUCT_TITLE: Locator = Locator::new(
    "product title",
    &[Selector::css(".product__title"), Selector::css(".product-title"), Selector::css("h1")],
);
const PRODUCT_PRICE: Locator = Locator::new(
    "product price",
    &[Selector::css(".product__price"), Selector::css(".product-price"), Selector::css(".price")],
);
const PRODUCT_DESCRIPTION: Locator = Locator::new(
    "product description",
    &[
        Selector::css(".product__description"),
        Selector::css(".product-description"),
        Selector::css(".description"),
    ],
);
const PRODUCT_SKU: Locator = Locator::new(
    "sku",
    &[Selector::css(".product__sku"), Selector::css(".product-sku"), Selector::css(".sku")],
);
const THUMBNAILS: Locator = Locator::new(
    "thumbnails",
    &[
        Selector::css(".product__thumbnails img"),
        Selector::css(".product-thumbnails img"),
        Selector::css(".thumbnail img"),
    ],
);
const SIZE_OPTIONS: Locator = Locator::new(
    "size selector",
    &[
        Selector::css("select[name*='size']"),
        Selector::css("select.size-selector"),
        Selector::css(".product__size select"),
    ],
);
const COLOR_OPTIONS: Locator = Locator::new(
    "color selector",
    &[
        Selector::css("select[name*='color']"),
        Selector::css("select.color-selector"),
        Selector::css(".product__color select"),
    ],
);
const QUANTITY_INPUT: Locator = Locator::new(
    "quantity",
    &[
        Selector::css("input[name*='quantity']"),
        Selector::css(".quantity__input"),
        Selector::css(".qty"),
    ],
);
const QUANTITY_INCREASE: Locator = Locator::new(
    "quantity increase",
    &[Selector::css(".quantity__button--increase"), Selector::css(".qty-plus")],
);
const QUANTITY_DECREASE: Locator = Locator::new(
    "quantity decrease",
    &[Selector::css(".quantity__button--decrease"), Selector::css(".qty-minus")],
);
const ADD_TO_CART: Locator = Locator::new(
    "add to cart",
    &[
        Selector::css(".btn--add-to-cart"),
        Selector::css(".add-to-cart"),
        Selector::css("button[name*='add']"),
    ],
);
const BUY_NOW: Locator =
    Locator::new("buy now", &[Selector::css(".buy-now"), Selector::css(".btn--buy-now")]);
const ADD_TO_WISHLIST: Locator = Locator::new(
    "add to wishlist",
    &[
        Selector::css(".add-to-wishlist"),
        Selector::css(".wishlist-add"),
        Selector::css("button[name*='wishlist']"),
    ],
);
const SHARE_BUTTON: Locator = Locator::new(
    "share",
    &[Selector::css(".share-product"), Selector::css(".product__share")],
);
static DESCRIPTION_TAB: Locator = Locator::new(
    "description tab",
    &[Selector::css("[data-tab='description']"), Selector::css(".tab--description")],
);
static SPECIFICATIONS_TAB: Locator = Locator::new(
    "specifications tab",
    &[Selector::css("[data-tab='specifications']"), Selector::css(".tab--specs")],
);
static REVIEWS_TAB: Locator = Locator::new(
    "reviews tab",
    &[Selector::css("[data-tab='reviews']"), Selector::css(".tab--reviews")],
);
static SHIPPING_TAB: Locator = Locator::new(
    "shipping tab",
    &[Selector::css("[data-tab='shipping']"), Selector::css(".tab--shipping")],
);
const REVIEW_ITEMS: Locator =
    Locator::new("reviews", &[Selector::css(".review"), Selector::css(".review-item")]);
const REVIEW_RATING: Locator = Locator::new(
    "review rating",
    &[Selector::css(".review__rating"), Selector::css(".rating")],
);
const REVIEW_TEXT: Locator = Locator::new(
    "review text",
    &[Selector::css(".review__text"), Selector::css(".review-content")],
);
const WRITE_REVIEW: Locator = Locator::new(
    "write review",
    &[Selector::css(".write-review"), Selector::css(".review-add")],
);
const RELATED_ITEMS: Locator = Locator::new(
    "related products",
    &[
        Selector::css(".related-products .product-item"),
        Selector::css(".recommended-products .product-item"),
    ],
);
const RELATED_TITLE: Locator = Locator::new(
    "related title",
    &[Selector::css(".product__title"), Selector::css(".product-title"), Selector::css("h3")],
);
const RELATED_PRICE: Locator = Locator::new(
    "related price",
    &[Selector::css(".product__price"), Selector::css(".price")],
);
const RELATED_IMAGE: Locator = Locator::new("related image", &[Selector::css("img")]);
const STOCK_STATUS: Locator = Locator::new(
    "stock status",
    &[
        Selector::css(".product__stock"),
        Selector::css(".stock-status"),
        Selector::css(".availability"),
    ],
);
const IN_STOCK: Locator =
    Locator::new("in stock", &[Selector::css(".in-stock"), Selector::css(".available")]);
const OUT_OF_STOCK: Locator = Locator::new(
    "out of stock",
    &[Selector::css(".out-of-stock"), Selector::css(".unavailable")],
);
const SUCCESS_MESSAGE: Locator = Locator::new(
    "product success",
    &[
        Selector::css(".success"),
        Selector::css(".alert-success"),
        Selector::css(".message--success"),
    ],
);
const ERROR_MESSAGE: Locator = Locator::new(
    "product error",
    &[Selector::css(".error"), Selector::css(".alert-error"), Selector::css(".message--error")],
);

/// Most related products read from a product page
pub const MAX_RELATED: usize = 5;

/// Product information tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductTab {
    Description,
    Specifications,
    Reviews,
    Shipping,
}

impl ProductTab {
    pub const ALL: [Self; 4] = [Self::Description, Self::Specifications, Self::Reviews, Self::Shipping];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Description => "description",
            Self::Specifications => "specifications",
            Self::Reviews => "reviews",
            Self::Shipping => "shipping",
        }
    }

    fn locator(self) -> &'static Locator {
        match self {
            Self::Description => &DESCRIPTION_TAB,
            Self::Specifications => &SPECIFICATIONS_TAB,
            Self::Reviews => &REVIEWS_TAB,
            Self::Shipping => &SHIPPING_TAB,
        }
    }
}

impl fmt::Display for ProductTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductTab {
    type Err = VitrineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|tab| tab.as_str() == wanted)
            .ok_or_else(|| VitrineError::invalid_input(format!("unknown product tab: {s}")))
    }
}

/// One customer review
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Review {
    /// `data-rating` when present, otherwise the rating text
    pub rating: String,
    pub text: String,
}

/// Product detail
#[derive(Debug, Clone, Copy)]
pub struct ProductPage<'s> {
    base: BasePage<'s>,
}

impl<'s> PageObject<'s> for ProductPage<'s> {
    /// Product pages have no fixed address; `load` opens the shop
    const KIND: PageKind = PageKind::Shop;

    fn from_base(base: BasePage<'s>) -> Self {
        Self { base }
    }

    fn base(&self) -> &BasePage<'s> {
        &self.base
    }

    fn is_loaded(&self) -> VitrineResult<bool> {
        let quick = self.base.within(self.base.settings().timeouts().confirm());
        Ok(quick.is_visible(&PRODUCT_TITLE)? && quick.is_visible(&ADD_TO_CART)?)
    }
}

impl ProductPage<'_> {
    /// Open a product by URL or path relative to the base URL
    pub fn open(&self, url_or_path: &str) -> VitrineResult<()> {
        self.base.navigate(&self.base.settings().absolute_url(url_or_path))
    }

    pub fn title(&self) -> VitrineResult<String> {
        self.base.text(&PRODUCT_TITLE)
    }

    pub fn price(&self) -> VitrineResult<String> {
        self.base.text(&PRODUCT_PRICE)
    }

    pub fn description(&self) -> VitrineResult<String> {
        self.base.text(&PRODUCT_DESCRIPTION)
    }

    pub fn sku(&self) -> VitrineResult<String> {
        self.base.text(&PRODUCT_SKU)
    }

    /// Choose a size by its visible label; `false` when there is no size selector
    pub fn select_size(&self, size: &str) -> VitrineResult<bool> {
        self.select_variant(&SIZE_OPTIONS, size)
    }

    /// Choose a color by its visible label
    pub fn select_color(&self, color: &str) -> VitrineResult<bool> {
        self.select_variant(&COLOR_OPTIONS, color)
    }

    fn select_variant(&self, selector: &Locator, label: &str) -> VitrineResult<bool> {
        if !self.base.is_present(selector)? {
            tracing::info!(selector = %selector, "variant selector absent");
            return Ok(false);
        }
        self.base.select_by_text(selector, label)
    }

    pub fn set_quantity(&self, quantity: u32) -> VitrineResult<bool> {
        self.base.type_text(&QUANTITY_INPUT, &quantity.to_string(), true)
    }

    /// Current quantity field value, 1 when unreadable
    pub fn quantity(&self) -> VitrineResult<u32> {
        let value = self.base.attribute(&QUANTITY_INPUT, "value")?;
        Ok(value.trim().parse().unwrap_or(1))
    }

    pub fn increase_quantity(&self) -> VitrineResult<bool> {
        self.base.click(&QUANTITY_INCREASE)
    }

    pub fn decrease_quantity(&self) -> VitrineResult<bool> {
        self.base.click(&QUANTITY_DECREASE)
    }

    /// Add to cart; without any feedback element this follows the outcome
    /// policy, which accepts by default
    pub fn add_to_cart(&self) -> VitrineResult<bool> {
        Ok(self.add_to_cart_outcome()?.is_accepted())
    }

    pub fn add_to_cart_outcome(&self) -> VitrineResult<Outcome> {
        if !self.base.click(&ADD_TO_CART)? {
            tracing::error!("add to cart button unavailable");
            return Ok(Outcome::RejectedSilently);
        }
        probe_outcome(&self.base, Some(&SUCCESS_MESSAGE), &ERROR_MESSAGE, false)
    }

    pub fn buy_now(&self) -> VitrineResult<bool> {
        if self.base.click(&BUY_NOW)? {
            self.base.wait_for_page_load()?;
            return Ok(true);
        }
        Ok(false)
    }

    pub fn add_to_wishlist(&self) -> VitrineResult<bool> {
        self.base.click(&ADD_TO_WISHLIST)
    }

    pub fn share_product(&self) -> VitrineResult<bool> {
        self.base.click(&SHARE_BUTTON)
    }

    /// Click gallery thumbnail `index`
    pub fn click_thumbnail(&self, index: usize) -> VitrineResult<bool> {
        self.base.click_nth(&THUMBNAILS, index)
    }

    pub fn switch_tab(&self, tab: ProductTab) -> VitrineResult<bool> {
        self.base.click(tab.locator())
    }

    /// Reviews with both a rating and a text
    pub fn reviews(&self) -> VitrineResult<Vec<Review>> {
        let items = self
            .base
            .within(self.base.settings().timeouts().probe())
            .find_all(&REVIEW_ITEMS)?;
        let mut reviews = Vec::new();
        for item in &items {
            let mut rating = self.base.attribute_within(item, &REVIEW_RATING, "data-rating")?;
            if rating.is_empty() {
                rating = self.base.text_within(item, &REVIEW_RATING)?;
            }
            let text = self.base.text_within(item, &REVIEW_TEXT)?;
            if rating.is_empty() || text.is_empty() {
                continue;
            }
            reviews.push(Review { rating, text });
        }
        Ok(reviews)
    }

    pub fn write_review(&self) -> VitrineResult<bool> {
        self.base.click(&WRITE_REVIEW)
    }

    /// Up to [`MAX_RELATED`] related products
    pub fn related_products(&self) -> VitrineResult<Vec<ProductCard>> {
        let items = self
            .base
            .within(self.base.settings().timeouts().probe())
            .find_all(&RELATED_ITEMS)?;
        let mut products = Vec::new();
        for item in items.iter().take(MAX_RELATED) {
            let title = self.base.text_within(item, &RELATED_TITLE)?;
            if title.is_empty() {
                continue;
            }
            products.push(ProductCard {
                title,
                price: self.base.text_within(item, &RELATED_PRICE)?,
                image_src: self.base.attribute_within(item, &RELATED_IMAGE, "src")?,
            });
        }
        Ok(products)
    }

    /// Stock badge first, then the add-to-cart button state; in stock when
    /// nothing says otherwise
    pub fn is_in_stock(&self) -> VitrineResult<bool> {
        let probe = self.base.within(self.base.settings().timeouts().probe());
        if probe.is_visible(&IN_STOCK)? {
            return Ok(true);
        }
        if probe.is_visible(&OUT_OF_STOCK)? {
            return Ok(false);
        }
        Ok(self.base.is_enabled_now(&ADD_TO_CART)?.unwrap_or(true))
    }

    pub fn stock_status(&self) -> VitrineResult<String> {
        self.base.text(&STOCK_STATUS)
    }

    pub fn success_message(&self) -> VitrineResult<String> {
        self.base
            .within(self.base.settings().timeouts().probe())
            .visible_text(&SUCCESS_MESSAGE)
    }

    pub fn error_message(&self) -> VitrineResult<String> {
        self.base
            .within(self.base.settings().timeouts().probe())
            .visible_text(&ERROR_MESSAGE)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::{Settings, Timeouts};
    use crate::fixture::{Effect, El, FixtureDocument, FixtureSession, FixtureSite};
    use crate::outcome::{AcceptSignal, OutcomePolicy};

    fn settings() -> Settings {
        Settings::default()
            .with_base_url("https://shop.test/")
            .with_timeouts(Timeouts::uniform(100, 10))
    }

    fn product(with_feedback: bool) -> FixtureSession {
        let mut doc = FixtureDocument::new("Block Heels")
            .with(El::new("h1").class("product__title").text("Block Heels"))
            .with(El::div("product__price").text("Ksh 3,200"))
            .with(El::div("product__sku").text("SKU-001"))
            .with(El::select(&["37", "38", "39"]).attr("name", "options[size]").id("size"))
            .with(El::input("number").attr("name", "quantity").attr("value", "1"))
            .with(El::button("Add to cart").class("add-to-cart").id("add"))
            .with(El::div("tabs").children([
                El::button("Description").attr("data-tab", "description"),
                El::button("Reviews").attr("data-tab", "reviews"),
            ]))
            .with(El::div("reviews").children([
                El::div("review")
                    .child(El::div("review__rating").attr("data-rating", "5").text("*****"))
                    .child(El::div("review__text").text("Comfortable")),
                El::div("review").child(El::div("review__rating").text("4/5")),
            ]))
            .with(El::div("related-products").children((0..7).map(|i| {
                El::div("product-item")
                    .child(El::new("h3").text(&format!("Related {i}")))
                    .child(El::div("price").text("Ksh 900"))
            })));
        if with_feedback {
            doc = doc
                .with(El::div("alert-success").id("added").hidden().text("Added to cart"))
                .on_click("add", |_, _, ()| vec![Effect::Show("added".into())]);
        }
        let site = FixtureSite::new("https://shop.test").static_page("/products/block-heels", doc);
        FixtureSession::open(site, (), "/products/block-heels")
    }

    #[test]
    fn test_add_to_cart_without_feedback_is_optimistic() {
        let s = product(false);
        let cfg = settings();
        let page = ProductPage::new(&s, &cfg);
        assert!(page.is_loaded().unwrap());
        assert!(page.add_to_cart().unwrap());
        assert_eq!(page.add_to_cart_outcome().unwrap(), Outcome::Accepted(AcceptSignal::Assumed));
        let strict = settings().with_outcome_policy(OutcomePolicy::Strict);
        assert!(!ProductPage::new(&s, &strict).add_to_cart().unwrap());
    }

    #[test]
    fn test_add_to_cart_confirmed() {
        let s = product(true);
        let cfg = settings();
        let page = ProductPage::new(&s, &cfg);
        assert_eq!(
            page.add_to_cart_outcome().unwrap(),
            Outcome::Accepted(AcceptSignal::SuccessIndicator)
        );
        assert_eq!(page.success_message().unwrap(), "Added to cart");
    }

    #[test]
    fn test_details_and_variants() {
        let s = product(false);
        let cfg = settings();
        let page = ProductPage::new(&s, &cfg);
        assert_eq!(page.title().unwrap(), "Block Heels");
        assert_eq!(page.price().unwrap(), "Ksh 3,200");
        assert_eq!(page.sku().unwrap(), "SKU-001");
        assert!(page.select_size("38").unwrap());
        assert!(!page.select_color("Red").unwrap());
        assert!(page.set_quantity(2).unwrap());
        assert_eq!(page.quantity().unwrap(), 2);
        assert!(page.is_in_stock().unwrap());
    }

    #[test]
    fn test_reviews_tabs_and_related() {
        let s = product(false);
        let cfg = settings();
        let page = ProductPage::new(&s, &cfg);
        assert!(page.switch_tab(ProductTab::Reviews).unwrap());
        assert!(!page.switch_tab(ProductTab::Shipping).unwrap());
        assert_eq!(
            page.reviews().unwrap(),
            vec![Review {
                rating: "5".into(),
                text: "Comfortable".into(),
            }]
        );
        let related = page.related_products().unwrap();
        assert_eq!(related.len(), MAX_RELATED);
        assert_eq!(related[4].title, "Related 4");
    }

    #[test]
    fn test_tab_parsing() {
        assert_eq!("Reviews".parse::<ProductTab>().unwrap(), ProductTab::Reviews);
        assert!("faq".parse::<ProductTab>().is_err());
    }
}
