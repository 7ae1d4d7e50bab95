//! Shop listing with category, size and sort controls.

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{BasePage, PageObject};
use crate::config::PageKind;
use crate::locator::{Locator, Selector};
use crate::result::{VitrineError, VitrineResult};

const PRODUCTS_COUNT: Locator = Locator::new(
    "products count",
    &[
        Selector::xpath("//*[contains(text(), 'Products found')]"),
        Selector::xpath("//*[contains(text(), 'products')]"),
    ],
);
const PRODUCT_GRID: Locator = Locator::new(
    "product grid",
    &[
        Selector::css(".products-grid"),
        Selector::css(".product-list"),
        Selector::css("[class*='product-grid']"),
    ],
);
const PRODUCT_CARDS: Locator = Locator::new(
    "product cards",
    &[Selector::css(".product-card"), Selector::css(".product-item")],
);
const PRODUCT_NAMES: Locator = Locator::new(
    "product names",
    &[
        Selector::css(".product-name"),
        Selector::css(".product-title"),
        Selector::css(".product-card h3"),
        Selector::css(".product-card h4"),
    ],
);
const PRODUCT_PRICES: Locator =
    Locator::new("product prices", &[Selector::xpath("//*[contains(text(), 'Ksh')]")]);
const ADD_TO_CART_BUTTONS: Locator = Locator::new(
    "add to cart",
    &[
        Selector::xpath("//button[contains(text(), 'Add to Cart')]"),
        Selector::xpath("//a[contains(text(), 'Add to Cart')]"),
    ],
);
const ADD_TO_WISHLIST_BUTTONS: Locator = Locator::new(
    "add to wishlist",
    &[
        Selector::css(".wishlist-btn"),
        Selector::css(".add-to-wishlist"),
        Selector::css("[class*='wishlist']"),
    ],
);
const SORT_DROPDOWN: Locator = Locator::new(
    "sort",
    &[
        Selector::css("#sort"),
        Selector::css("select[name*='sort']"),
        Selector::css("select.sort-select"),
    ],
);
const PREVIOUS_PAGE: Locator = Locator::new(
    "previous page",
    &[
        Selector::xpath("//a[contains(text(), 'Previous')]"),
        Selector::xpath("//a[contains(@class, 'prev')]"),
    ],
);
const NEXT_PAGE: Locator = Locator::new(
    "next page",
    &[
        Selector::xpath("//a[contains(text(), 'Next')]"),
        Selector::xpath("//a[contains(@class, 'next')]"),
    ],
);
const PAGE_NUMBERS: Locator = Locator::new(
    "page numbers",
    &[
        Selector::css(".page-numbers a"),
        Selector::css(".pagination a"),
        Selector::css(".page-numbers span"),
    ],
);
const CURRENT_PAGE: Locator = Locator::new(
    "current page",
    &[
        Selector::css(".page-numbers .current"),
        Selector::css(".pagination .current"),
        Selector::css(".pagination .active"),
    ],
);
const SEARCH_INPUT: Locator = Locator::new(
    "shop search",
    &[
        Selector::css("input[type='search']"),
        Selector::css("input[name*='search']"),
        Selector::css(".search-input"),
    ],
);
const SEARCH_BUTTON: Locator = Locator::new(
    "shop search button",
    &[Selector::css(".search-btn"), Selector::css(".search-button")],
);
const NO_PRODUCTS: Locator = Locator::new(
    "no products message",
    &[
        Selector::xpath("//*[contains(text(), 'No products found')]"),
        Selector::xpath("//*[contains(text(), 'no results')]"),
    ],
);

/// Currency marker separating prices from names
const PRICE_MARKER: &str = "Ksh";

/// Shoe categories offered as filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShopCategory {
    Heels,
    Wedges,
    Boots,
    Sandals,
    Loafers,
    Sneakers,
}

impl ShopCategory {
    pub const ALL: [Self; 6] = [
        Self::Heels,
        Self::Wedges,
        Self::Boots,
        Self::Sandals,
        Self::Loafers,
        Self::Sneakers,
    ];

    /// Filter label as shown on the site
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Heels => "HEELS",
            Self::Wedges => "WEDGES",
            Self::Boots => "BOOTS",
            Self::Sandals => "SANDALS",
            Self::Loafers => "LOAFERS",
            Self::Sneakers => "SNEAKERS",
        }
    }

    fn locator(self) -> Locator {
        let label = self.label();
        Locator::dynamic(
            format!("{label} filter"),
            &[
                Selector::xpath(&format!("//a[contains(text(), '{label}')]")),
                Selector::xpath(&format!("//label[contains(text(), '{label}')]")),
            ],
        )
    }
}

impl fmt::Display for ShopCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ShopCategory {
    type Err = VitrineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|c| c.label() == wanted)
            .ok_or_else(|| VitrineError::invalid_input(format!("unsupported category: {s}")))
    }
}

/// EU shoe size offered as a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ShoeSize(u8);

impl ShoeSize {
    /// Sizes the shop filters by
    pub const AVAILABLE: [u8; 10] = [35, 36, 37, 38, 39, 40, 41, 42, 44, 46];

    /// Validate a size
    pub fn new(size: u8) -> VitrineResult<Self> {
        if Self::AVAILABLE.contains(&size) {
            Ok(Self(size))
        } else {
            Err(VitrineError::invalid_input(format!("unsupported size: {size}")))
        }
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Every offered size, ascending
    pub fn all() -> impl Iterator<Item = Self> {
        Self::AVAILABLE.into_iter().map(Self)
    }

    fn locator(self) -> Locator {
        let size = self.0;
        Locator::dynamic(
            format!("size {size} filter"),
            &[
                Selector::xpath(&format!("//a[text()='{size}']")),
                Selector::xpath(&format!("//label[text()='{size}']")),
            ],
        )
    }
}

impl fmt::Display for ShoeSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ShoeSize {
    type Err = VitrineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let size = s
            .trim()
            .parse::<u8>()
            .map_err(|_| VitrineError::invalid_input(format!("unsupported size: {s}")))?;
        Self::new(size)
    }
}

/// Listing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Default,
    Rating,
    Latest,
    PriceLow,
    PriceHigh,
}

impl SortOrder {
    pub const ALL: [Self; 5] = [
        Self::Default,
        Self::Rating,
        Self::Latest,
        Self::PriceLow,
        Self::PriceHigh,
    ];

    /// Visible option text in the sort dropdown
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Default => "Default sorting",
            Self::Rating => "Sort by average rating",
            Self::Latest => "Sort by latest",
            Self::PriceLow => "Sort by price: low to high",
            Self::PriceHigh => "Sort by price: high to low",
        }
    }
}

/// First run of digits in `text`
fn first_integer(text: &str) -> Option<usize> {
    let digits = Regex::new(r"\d+").ok()?;
    digits.find(text)?.as_str().parse().ok()
}

/// Shop listing
#[derive(Debug, Clone, Copy)]
pub struct ShopPage<'s> {
    base: BasePage<'s>,
}

impl<'s> PageObject<'s> for ShopPage<'s> {
    const KIND: PageKind = PageKind::Shop;

    fn from_base(base: BasePage<'s>) -> Self {
        Self { base }
    }

    fn base(&self) -> &BasePage<'s> {
        &self.base
    }

    fn is_loaded(&self) -> VitrineResult<bool> {
        self.is_shop_page_loaded()
    }
}

impl ShopPage<'_> {
    /// Grid, a product card or the count banner is visible
    pub fn is_shop_page_loaded(&self) -> VitrineResult<bool> {
        let quick = self.base.within(self.base.settings().timeouts().confirm());
        Ok(quick.is_visible(&PRODUCT_GRID)?
            || quick.is_visible(&PRODUCT_CARDS)?
            || quick.is_visible(&PRODUCTS_COUNT)?)
    }

    /// Count banner as displayed, empty when hidden
    pub fn products_count_text(&self) -> VitrineResult<String> {
        self.base
            .within(self.base.settings().timeouts().probe())
            .visible_text(&PRODUCTS_COUNT)
    }

    /// First integer of the count banner; 0 when there is none
    pub fn total_product_count(&self) -> VitrineResult<usize> {
        Ok(first_integer(&self.products_count_text()?).unwrap_or(0))
    }

    pub fn visible_product_count(&self) -> VitrineResult<usize> {
        Ok(self
            .base
            .within(self.base.settings().timeouts().probe())
            .find_all(&PRODUCT_CARDS)?
            .len())
    }

    /// Card names, skipping price-like text
    pub fn product_names(&self) -> VitrineResult<Vec<String>> {
        let names = self.base.texts(&PRODUCT_NAMES)?;
        Ok(names.into_iter().filter(|n| !n.contains(PRICE_MARKER)).collect())
    }

    /// Texts carrying the currency marker
    pub fn product_prices(&self) -> VitrineResult<Vec<String>> {
        let prices = self.base.texts(&PRODUCT_PRICES)?;
        Ok(prices.into_iter().filter(|p| p.contains(PRICE_MARKER)).collect())
    }

    /// Open the product whose heading contains `name`
    pub fn click_product_by_name(&self, name: &str) -> VitrineResult<bool> {
        if name.contains('\'') {
            return Err(VitrineError::invalid_input(format!("unsupported product name: {name}")));
        }
        let queries: Vec<String> = ["h3", "h4", "h5", "h6"]
            .into_iter()
            .map(|tag| format!("//{tag}[contains(text(), '{name}')]"))
            .collect();
        let selectors: Vec<Selector<'_>> = queries.iter().map(|q| Selector::xpath(q)).collect();
        let heading = Locator::dynamic(format!("product {name}"), &selectors);
        self.click_and_settle(&heading)
    }

    pub fn add_first_product_to_cart(&self) -> VitrineResult<bool> {
        self.add_product_to_cart(0)
    }

    /// Press the add-to-cart control of card `index`
    pub fn add_product_to_cart(&self, index: usize) -> VitrineResult<bool> {
        let added = self.base.click_nth(&ADD_TO_CART_BUTTONS, index)?;
        if added {
            tracing::info!(index, "added product to cart");
        }
        Ok(added)
    }

    pub fn add_product_to_wishlist(&self, index: usize) -> VitrineResult<bool> {
        self.base.click_nth(&ADD_TO_WISHLIST_BUTTONS, index)
    }

    pub fn filter_by_category(&self, category: ShopCategory) -> VitrineResult<bool> {
        self.apply_filter(&category.locator())
    }

    pub fn filter_by_size(&self, size: ShoeSize) -> VitrineResult<bool> {
        self.apply_filter(&size.locator())
    }

    fn apply_filter(&self, filter: &Locator) -> VitrineResult<bool> {
        let probe = self.base.within(self.base.settings().timeouts().probe());
        if !probe.is_visible(filter)? {
            tracing::warn!(filter = %filter, "filter not offered");
            return Ok(false);
        }
        self.click_and_settle(filter)
    }

    pub fn sort_by(&self, order: SortOrder) -> VitrineResult<bool> {
        let probe = self.base.within(self.base.settings().timeouts().probe());
        if !probe.is_visible(&SORT_DROPDOWN)? {
            tracing::warn!("sort dropdown not found");
            return Ok(false);
        }
        if self.base.select_by_text(&SORT_DROPDOWN, order.label())? {
            self.base.wait_for_page_load()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Search from the shop's own search box, button or Enter
    pub fn search(&self, term: &str) -> VitrineResult<bool> {
        let probe = self.base.within(self.base.settings().timeouts().probe());
        if !probe.type_text(&SEARCH_INPUT, term, true)? {
            tracing::warn!("search input not found");
            return Ok(false);
        }
        if !probe.click(&SEARCH_BUTTON)? && !self.base.press_enter(&SEARCH_INPUT)? {
            return Ok(false);
        }
        self.base.wait_for_page_load()?;
        Ok(true)
    }

    pub fn next_page(&self) -> VitrineResult<bool> {
        self.click_and_settle(&NEXT_PAGE)
    }

    pub fn previous_page(&self) -> VitrineResult<bool> {
        self.click_and_settle(&PREVIOUS_PAGE)
    }

    pub fn go_to_page(&self, number: usize) -> VitrineResult<bool> {
        if self.base.click_by_text(&PAGE_NUMBERS, &number.to_string())? {
            self.base.wait_for_page_load()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Highlighted page number, 1 when there is no pagination
    pub fn current_page_number(&self) -> VitrineResult<usize> {
        let text = self
            .base
            .within(self.base.settings().timeouts().probe())
            .text(&CURRENT_PAGE)?;
        Ok(text.parse().unwrap_or(1))
    }

    pub fn has_products(&self) -> VitrineResult<bool> {
        Ok(self.visible_product_count()? > 0)
    }

    pub fn has_no_products(&self) -> VitrineResult<bool> {
        self.base
            .within(self.base.settings().timeouts().probe())
            .is_visible(&NO_PRODUCTS)
    }

    fn click_and_settle(&self, locator: &Locator) -> VitrineResult<bool> {
        if self.base.click(locator)? {
            self.base.wait_for_page_load()?;
            return Ok(true);
        }
        Ok(false)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::{Settings, Timeouts};
    use crate::fixture::{El, FixtureDocument, FixtureSession, FixtureSite, Request};
    use proptest::prelude::*;

    fn settings() -> Settings {
        Settings::default()
            .with_base_url("https://shop.test/")
            .with_timeouts(Timeouts::uniform(100, 10))
    }

    fn listing(req: &Request) -> FixtureDocument {
        let category = req.param("category").unwrap_or("all").to_string();
        let page: usize = req.param("page").and_then(|p| p.parse().ok()).unwrap_or(1);
        let names: &[&str] = if category == "boots" {
            &["Chelsea Boot"]
        } else {
            &["Block Heel", "Platform Wedge", "Chelsea Boot"]
        };
        FixtureDocument::new("Shop")
            .with(El::new("p").class("count").text(&format!("{} Products found", names.len() * 10)))
            .with(El::div("filters").children([
                El::link("/shop?category=heels", "HEELS"),
                El::link("/shop?category=boots", "BOOTS"),
                El::link("/shop?size=38", "38"),
            ]))
            .with(El::div("products-grid").children(names.iter().map(|name| {
                El::div("product-card")
                    .child(El::new("h3").text(name))
                    .child(El::new("span").class("amount").text("Ksh 2,999"))
                    .child(El::button("Add to Cart"))
            })))
            .with(El::new("nav").class("page-numbers").children([
                El::new("span").class(if page == 1 { "current" } else { "page" }).text("1"),
                El::link("/shop?page=2", "2").class(if page == 2 { "current" } else { "page" }),
                El::link("/shop?page=2", "Next").class("next"),
            ]))
    }

    fn session() -> FixtureSession {
        let site = FixtureSite::new("https://shop.test").page("/shop", |req, ()| listing(req));
        FixtureSession::open(site, (), "/shop")
    }

    #[test]
    fn test_listing_reads() {
        let s = session();
        let cfg = settings();
        let page = ShopPage::new(&s, &cfg);
        assert!(page.is_shop_page_loaded().unwrap());
        assert_eq!(page.total_product_count().unwrap(), 30);
        assert_eq!(page.visible_product_count().unwrap(), 3);
        assert_eq!(page.product_names().unwrap(), vec!["Block Heel", "Platform Wedge", "Chelsea Boot"]);
        assert_eq!(page.product_prices().unwrap().len(), 3);
        assert!(page.has_products().unwrap());
        assert!(!page.has_no_products().unwrap());
    }

    #[test]
    fn test_category_and_size_filters() {
        let s = session();
        let cfg = settings();
        let page = ShopPage::new(&s, &cfg);
        assert!(page.filter_by_category(ShopCategory::Boots).unwrap());
        assert_eq!(page.visible_product_count().unwrap(), 1);
        assert!(!page.filter_by_category(ShopCategory::Sneakers).unwrap());
        assert!(page.filter_by_size(ShoeSize::new(38).unwrap()).unwrap());
        assert!(!page.filter_by_size(ShoeSize::new(46).unwrap()).unwrap());
    }

    #[test]
    fn test_pagination() {
        let s = session();
        let cfg = settings();
        let page = ShopPage::new(&s, &cfg);
        assert_eq!(page.current_page_number().unwrap(), 1);
        assert!(page.next_page().unwrap());
        assert_eq!(page.current_page_number().unwrap(), 2);
        assert!(!page.previous_page().unwrap());
        assert!(!page.go_to_page(7).unwrap());
    }

    #[test]
    fn test_cart_and_missing_controls() {
        let s = session();
        let cfg = settings();
        let page = ShopPage::new(&s, &cfg);
        assert!(page.add_first_product_to_cart().unwrap());
        assert!(!page.add_product_to_cart(9).unwrap());
        assert!(!page.sort_by(SortOrder::PriceLow).unwrap());
        assert!(!page.search("boots").unwrap());
    }

    #[test]
    fn test_first_integer() {
        assert_eq!(first_integer("193 Products found"), Some(193));
        assert_eq!(first_integer("Showing 1-24 of 193"), Some(1));
        assert_eq!(first_integer("no count"), None);
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("heels".parse::<ShopCategory>().unwrap(), ShopCategory::Heels);
        assert!("hats".parse::<ShopCategory>().is_err());
        assert_eq!(ShopCategory::ALL.len(), 6);
    }

    proptest! {
        #[test]
        fn prop_only_offered_sizes_validate(size in 30u8..50) {
            let valid = ShoeSize::new(size).is_ok();
            prop_assert_eq!(valid, ShoeSize::AVAILABLE.contains(&size));
            if valid {
                prop_assert_eq!(size.to_string().parse::<ShoeSize>().unwrap().value(), size);
            }
        }
    }
}
