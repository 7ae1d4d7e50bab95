//! Search results listing.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use super::{BasePage, PageObject};
use crate::config::PageKind;
use crate::fixture::percent_encode;
use crate::locator::{Locator, Selector};
use crate::result::{VitrineError, VitrineResult};

const QUERY_DISPLAY: Locator = Locator::new(
    "search query",
    &[Selector::css(".search-query"), Selector::css(".search-term"), Selector::css(".current-search")],
);
const RESULTS_COUNT: Locator = Locator::new(
    "results count",
    &[Selector::css(".results-count"), Selector::css(".search-count"), Selector::css(".total-results")],
);
const NO_RESULTS: Locator = Locator::new(
    "no results message",
    &[Selector::css(".no-results"), Selector::css(".empty-search"), Selector::css(".search-empty")],
);
const PRODUCT_GRID: Locator = Locator::new(
    "results grid",
    &[Selector::css(".product-grid"), Selector::css(".search-results"), Selector::css(".results-grid")],
);
const PRODUCT_ITEMS: Locator = Locator::new(
    "result items",
    &[
        Selector::css(".product-item"),
        Selector::css(".product-card"),
        Selector::css(".search-results .grid__item"),
    ],
);
const ITEM_TITLE: Locator = Locator::new(
    "result title",
    &[Selector::css(".product__title"), Selector::css(".product-title"), Selector::css("h3")],
);
const ITEM_PRICE: Locator = Locator::new(
    "result price",
    &[Selector::css(".product__price"), Selector::css(".product-price"), Selector::css(".price")],
);
const ITEM_IMAGE: Locator = Locator::new(
    "result image",
    &[Selector::css(".product__image img"), Selector::css(".product-image img")],
);
const ITEM_LINK: Locator = Locator::new(
    "result link",
    &[Selector::css(".product__link"), Selector::css(".product-link"), Selector::css("a")],
);
const ADD_TO_CART_BUTTONS: Locator = Locator::new(
    "quick add",
    &[
        Selector::css(".add-to-cart"),
        Selector::css(".quick-add"),
        Selector::css("button[name*='add']"),
    ],
);
const ADD_TO_WISHLIST_BUTTONS: Locator = Locator::new(
    "result wishlist",
    &[Selector::css(".add-to-wishlist"), Selector::css(".wishlist-add")],
);
const SORT_DROPDOWN: Locator = Locator::new(
    "sort",
    &[
        Selector::css("select[name*='sort']"),
        Selector::css("select.sort-dropdown"),
        Selector::css("select.sort-select"),
    ],
);
const GRID_VIEW: Locator =
    Locator::new("grid view", &[Selector::css(".view-grid"), Selector::css(".grid-view")]);
const LIST_VIEW: Locator =
    Locator::new("list view", &[Selector::css(".view-list"), Selector::css(".list-view")]);
const PRICE_FILTER: Locator = Locator::new(
    "price filter",
    &[Selector::css(".price-filter"), Selector::css(".filter-price")],
);
const PRICE_MIN: Locator = Locator::new(
    "minimum price",
    &[Selector::css("input[name*='min']"), Selector::css("input[placeholder*='Min']")],
);
const PRICE_MAX: Locator = Locator::new(
    "maximum price",
    &[Selector::css("input[name*='max']"), Selector::css("input[placeholder*='Max']")],
);
static CATEGORY_FILTER: Locator = Locator::new(
    "category filter",
    &[Selector::css(".category-filter"), Selector::css(".filter-category")],
);
static SIZE_FILTER: Locator =
    Locator::new("size filter", &[Selector::css(".size-filter"), Selector::css(".filter-size")]);
static COLOR_FILTER: Locator = Locator::new(
    "color filter",
    &[Selector::css(".color-filter"), Selector::css(".filter-color")],
);
static BRAND_FILTER: Locator = Locator::new(
    "brand filter",
    &[Selector::css(".brand-filter"), Selector::css(".filter-brand")],
);
const APPLY_FILTERS: Locator = Locator::new(
    "apply filters",
    &[Selector::css(".apply-filters"), Selector::css(".filter-apply")],
);
const CLEAR_FILTERS: Locator = Locator::new(
    "clear filters",
    &[Selector::css(".clear-filters"), Selector::css(".filter-clear")],
);
const NEXT_PAGE: Locator = Locator::new(
    "next page",
    &[
        Selector::css(".pagination__next"),
        Selector::css(".pagination .next"),
        Selector::css(".pager__next"),
    ],
);
const PREVIOUS_PAGE: Locator = Locator::new(
    "previous page",
    &[
        Selector::css(".pagination__prev"),
        Selector::css(".pagination .prev"),
        Selector::css(".pager__prev"),
    ],
);
const PAGE_NUMBERS: Locator = Locator::new(
    "page numbers",
    &[Selector::css(".pagination__number"), Selector::css(".page-number")],
);
const CURRENT_PAGE: Locator = Locator::new(
    "current page",
    &[
        Selector::css(".pagination .current"),
        Selector::css(".pagination__number--current"),
        Selector::css("[aria-current='page']"),
    ],
);
const PER_PAGE: Locator = Locator::new(
    "results per page",
    &[Selector::css("select[name*='per_page']"), Selector::css("select.per-page-select")],
);

/// Layout of the results listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultsView {
    Grid,
    List,
}

impl fmt::Display for ResultsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Grid => "grid",
            Self::List => "list",
        })
    }
}

/// Facet a result listing can be narrowed by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Facet {
    Category,
    Size,
    Color,
    Brand,
}

impl Facet {
    fn section(self) -> &'static Locator {
        match self {
            Self::Category => &CATEGORY_FILTER,
            Self::Size => &SIZE_FILTER,
            Self::Color => &COLOR_FILTER,
            Self::Brand => &BRAND_FILTER,
        }
    }
}

/// One product in the listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub title: String,
    pub price: String,
    pub link: String,
    pub image_src: String,
}

/// Search results
#[derive(Debug, Clone, Copy)]
pub struct SearchResultsPage<'s> {
    base: BasePage<'s>,
}

impl<'s> PageObject<'s> for SearchResultsPage<'s> {
    const KIND: PageKind = PageKind::Search;

    fn from_base(base: BasePage<'s>) -> Self {
        Self { base }
    }

    fn base(&self) -> &BasePage<'s> {
        &self.base
    }

    fn is_loaded(&self) -> VitrineResult<bool> {
        Ok(self.base.url_contains("search")?
            || self.base.is_present(&PRODUCT_GRID)?
            || self.base.is_present(&NO_RESULTS)?)
    }
}

impl SearchResultsPage<'_> {
    /// Open the listing for `term` directly
    pub fn search(&self, term: &str) -> VitrineResult<()> {
        let url = format!(
            "{}?q={}",
            self.base.settings().url_for(PageKind::Search),
            percent_encode(term)
        );
        self.base.navigate(&url)
    }

    /// At least one result and no "no results" notice
    pub fn has_results(&self) -> VitrineResult<bool> {
        let items = self
            .base
            .within(self.base.settings().timeouts().probe())
            .find_all(&PRODUCT_ITEMS)?;
        if items.is_empty() {
            return Ok(false);
        }
        Ok(!self.base.within(Duration::ZERO).is_visible(&NO_RESULTS)?)
    }

    pub fn search_query(&self) -> VitrineResult<String> {
        self.base.text(&QUERY_DISPLAY)
    }

    pub fn results_count_text(&self) -> VitrineResult<String> {
        self.base.text(&RESULTS_COUNT)
    }

    pub fn no_results_message(&self) -> VitrineResult<String> {
        self.base
            .within(self.base.settings().timeouts().probe())
            .text(&NO_RESULTS)
    }

    pub fn search_results(&self) -> VitrineResult<Vec<SearchResult>> {
        let items = self
            .base
            .within(self.base.settings().timeouts().probe())
            .find_all(&PRODUCT_ITEMS)?;
        let mut results = Vec::with_capacity(items.len());
        for item in &items {
            let title = self.base.text_within(item, &ITEM_TITLE)?;
            if title.is_empty() {
                tracing::warn!(item = %item, "result without title");
                continue;
            }
            results.push(SearchResult {
                title,
                price: self.base.text_within(item, &ITEM_PRICE)?,
                link: self.base.attribute_within(item, &ITEM_LINK, "href")?,
                image_src: self.base.attribute_within(item, &ITEM_IMAGE, "src")?,
            });
        }
        Ok(results)
    }

    /// Open result `index`
    pub fn click_product(&self, index: usize) -> VitrineResult<bool> {
        let Some(item) = self.base.find_all(&PRODUCT_ITEMS)?.into_iter().nth(index) else {
            tracing::warn!(index, "no result at index");
            return Ok(false);
        };
        if self.base.click_within(&item, &ITEM_LINK)? {
            self.base.wait_for_page_load()?;
            return Ok(true);
        }
        Ok(false)
    }

    pub fn add_to_cart(&self, index: usize) -> VitrineResult<bool> {
        self.click_nth_and_settle(&ADD_TO_CART_BUTTONS, index)
    }

    pub fn add_to_wishlist(&self, index: usize) -> VitrineResult<bool> {
        self.base.click_nth(&ADD_TO_WISHLIST_BUTTONS, index)
    }

    fn click_nth_and_settle(&self, locator: &Locator, index: usize) -> VitrineResult<bool> {
        if self.base.click_nth(locator, index)? {
            self.base.wait_for_page_load()?;
            return Ok(true);
        }
        Ok(false)
    }

    fn click_and_settle(&self, locator: &Locator) -> VitrineResult<bool> {
        if self.base.click(locator)? {
            self.base.wait_for_page_load()?;
            return Ok(true);
        }
        Ok(false)
    }

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

    /// Narrow by a facet value, shown either as a checkbox or as a link
    ///
    /// Checkboxes are followed by [`Self::apply_filters`].
    pub fn apply_filter(&self, facet: Facet, value: &str) -> VitrineResult<bool> {
        if value.contains('\'') {
            return Err(VitrineError::invalid_input(format!("unsupported filter value: {value}")));
        }
        let Some(section) = self
            .base
            .within(self.base.settings().timeouts().probe())
            .find_all(facet.section())?
            .into_iter()
            .next()
        else {
            tracing::info!(?facet, "filter section absent");
            return Ok(false);
        };
        let checkbox = Locator::dynamic(
            format!("{value} checkbox"),
            &[Selector::css(&format!("input[value='{value}']"))],
        );
        if self.base.click_within(&section, &checkbox)? {
            return self.apply_filters();
        }
        let link = Locator::dynamic(
            format!("{value} link"),
            &[Selector::xpath(&format!("//a[contains(text(), '{value}')]"))],
        );
        if self.base.click_within(&section, &link)? {
            self.base.wait_for_page_load()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Fill the price range inputs that are given
    pub fn apply_price_filter(&self, min: Option<&str>, max: Option<&str>) -> VitrineResult<bool> {
        let Some(section) = self
            .base
            .within(self.base.settings().timeouts().probe())
            .find_all(&PRICE_FILTER)?
            .into_iter()
            .next()
        else {
            return Ok(false);
        };
        for (input, value) in [(&PRICE_MIN, min), (&PRICE_MAX, max)] {
            if let Some(value) = value {
                if !self.base.type_within(&section, input, value)? {
                    tracing::warn!(field = %input, "price bound not typed");
                }
            }
        }
        self.apply_filters()
    }

    /// Press the apply control when there is one; filters without it
    /// apply on change
    pub fn apply_filters(&self) -> VitrineResult<bool> {
        if self.base.is_present(&APPLY_FILTERS)? {
            self.base.click(&APPLY_FILTERS)?;
            self.base.wait_for_page_load()?;
        }
        Ok(true)
    }

    pub fn clear_filters(&self) -> VitrineResult<bool> {
        self.click_and_settle(&CLEAR_FILTERS)
    }

    pub fn switch_view(&self, view: ResultsView) -> VitrineResult<bool> {
        match view {
            ResultsView::Grid => self.base.click(&GRID_VIEW),
            ResultsView::List => self.base.click(&LIST_VIEW),
        }
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
    pub fn current_page(&self) -> VitrineResult<usize> {
        let text = self
            .base
            .within(self.base.settings().timeouts().probe())
            .text(&CURRENT_PAGE)?;
        Ok(text.parse().unwrap_or(1))
    }

    pub fn set_results_per_page(&self, count: usize) -> VitrineResult<bool> {
        if !self.base.is_present(&PER_PAGE)? {
            return Ok(false);
        }
        if self.base.select_by_text(&PER_PAGE, &count.to_string())? {
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
    use crate::fixture::{Effect, El, FixtureDocument, FixtureSession, FixtureSite, Request};
    use crate::session::Session;

    fn settings() -> Settings {
        Settings::default()
            .with_base_url("https://shop.test/")
            .with_timeouts(Timeouts::uniform(100, 10))
    }

    fn listing(req: &Request) -> FixtureDocument {
        let query = req.param("q").unwrap_or_default().to_string();
        let page: usize = req.param("page").and_then(|p| p.parse().ok()).unwrap_or(1);
        let mut doc = FixtureDocument::new("Search")
            .with(El::div("search-query").text(&query));
        if query == "dress" {
            doc = doc
                .with(El::div("results-count").text("2 results"))
                .with(El::div("product-grid").children([
                    El::div("product-item")
                        .child(El::new("h3").text("Maxi Dress"))
                        .child(El::div("price").text("Ksh 4,000"))
                        .child(El::link("/products/maxi-dress", "Maxi Dress")),
                    El::div("product-item")
                        .child(El::new("h3").text("Wrap Dress"))
                        .child(El::div("price").text("Ksh 3,500"))
                        .child(El::link("/products/wrap-dress", "Wrap Dress")),
                ]))
                .with(El::div("category-filter").children([
                    El::input("checkbox").attr("value", "Dresses").id("f-dresses"),
                    El::link("/search?q=dress&category=evening", "Evening"),
                ]))
                .with(El::div("pagination").children([
                    El::new("span").class("pagination__number").class(if page == 1 { "current" } else { "other" }).text("1"),
                    El::link("/search?q=dress&page=2", "2").class("pagination__number").class(if page == 2 { "current" } else { "other" }),
                ]));
        } else {
            doc = doc.with(El::div("no-results").text(&format!("No results found for \"{query}\"")));
        }
        doc.on_click("f-dresses", |_, _, ()| vec![Effect::Reload])
    }

    fn session(query: &str) -> FixtureSession {
        let site = FixtureSite::new("https://shop.test")
            .page("/search", |req, ()| listing(req))
            .static_page("/products/wrap-dress", FixtureDocument::new("Wrap Dress"));
        FixtureSession::open(site, (), &format!("/search?q={query}"))
    }

    #[test]
    fn test_results_listed() {
        let s = session("dress");
        let cfg = settings();
        let page = SearchResultsPage::new(&s, &cfg);
        assert!(page.is_loaded().unwrap());
        assert!(page.has_results().unwrap());
        assert_eq!(page.search_query().unwrap(), "dress");
        assert_eq!(page.results_count_text().unwrap(), "2 results");
        let results = page.search_results().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].link, "/products/wrap-dress");
        assert!(page.click_product(1).unwrap());
        assert_eq!(s.title().unwrap(), "Wrap Dress");
    }

    #[test]
    fn test_no_results() {
        let s = session("zzz");
        let cfg = settings();
        let page = SearchResultsPage::new(&s, &cfg);
        assert!(page.is_loaded().unwrap());
        assert!(!page.has_results().unwrap());
        assert_eq!(page.no_results_message().unwrap(), "No results found for \"zzz\"");
        assert!(!page.add_to_cart(0).unwrap());
    }

    #[test]
    fn test_filters_and_pagination() {
        let s = session("dress");
        let cfg = settings();
        let page = SearchResultsPage::new(&s, &cfg);
        assert!(page.apply_filter(Facet::Category, "Dresses").unwrap());
        assert!(!page.apply_filter(Facet::Brand, "Acme").unwrap());
        assert!(page.apply_filter(Facet::Category, "O'Neil").is_err());
        assert_eq!(page.current_page().unwrap(), 1);
        assert!(page.go_to_page(2).unwrap());
        assert_eq!(page.current_page().unwrap(), 2);
        assert!(!page.next_page().unwrap());
    }

    #[test]
    fn test_direct_search_url() {
        let s = session("zzz");
        let cfg = settings();
        let page = SearchResultsPage::new(&s, &cfg);
        page.search("dress").unwrap();
        assert!(s.current_url().unwrap().ends_with("/search?q=dress"));
        assert!(page.has_results().unwrap());
    }
}
