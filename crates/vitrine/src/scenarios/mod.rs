//! The bundled storefront suite.
//!
//! One module per area, each exporting its scenarios in declaration order.
//! Scenarios that need state the suite does not control (a filled cart, a
//! reachable recovery page) establish it first and skip through
//! [`assume`] when they cannot.

mod cart;
mod error_handling;
mod forgot_password;
mod home;
mod login;
mod navigation;
mod product;
mod registration;
mod search;
mod shop;
mod wishlist;

use crate::harness::{assume, Scenario, ScenarioContext};
use crate::page::{CartPage, PageObject, ProductPage, SearchResultsPage, WishlistPage};
use crate::result::VitrineResult;

/// Every bundled scenario, grouped by file
#[must_use]
pub fn catalog() -> Vec<Scenario> {
    [
        home::SCENARIOS,
        login::SCENARIOS,
        registration::SCENARIOS,
        forgot_password::SCENARIOS,
        product::SCENARIOS,
        cart::SCENARIOS,
        wishlist::SCENARIOS,
        search::SCENARIOS,
        shop::SCENARIOS,
        navigation::SCENARIOS,
        error_handling::SCENARIOS,
    ]
    .concat()
}

/// Catalog file names, in run order
#[must_use]
pub fn files() -> Vec<&'static str> {
    let mut files: Vec<&'static str> = Vec::new();
    for scenario in catalog() {
        if !files.contains(&scenario.file) {
            files.push(scenario.file);
        }
    }
    files
}

/// First configured search term
fn search_term(ctx: &ScenarioContext<'_>) -> String {
    ctx.settings()
        .search_terms()
        .first()
        .cloned()
        .unwrap_or_else(|| "dress".to_string())
}

/// Search for the first term and open its first result
fn open_first_product<'s>(ctx: &ScenarioContext<'s>) -> VitrineResult<ProductPage<'s>> {
    let term = search_term(ctx);
    let results = ctx.page::<SearchResultsPage>();
    results.search(&term)?;
    assume(results.has_results()?, format!("no products found for {term:?}"))?;
    assume(results.click_product(0)?, "could not open the first search result")?;
    let product = ctx.page::<ProductPage>();
    assume(product.is_loaded()?, "product page did not load")?;
    Ok(product)
}

/// Put one product in the cart and open the cart page
fn cart_with_item<'s>(ctx: &ScenarioContext<'s>) -> VitrineResult<CartPage<'s>> {
    let product = open_first_product(ctx)?;
    assume(product.is_in_stock()?, "first product is out of stock")?;
    product.add_to_cart()?;
    let cart = ctx.open::<CartPage>()?;
    assume(!cart.is_cart_empty()?, "cart is empty after adding a product")?;
    Ok(cart)
}

/// Put two search results on the wishlist and open the wishlist page
fn wishlist_with_items<'s>(ctx: &ScenarioContext<'s>) -> VitrineResult<WishlistPage<'s>> {
    let term = search_term(ctx);
    let results = ctx.page::<SearchResultsPage>();
    results.search(&term)?;
    assume(results.has_results()?, format!("no products found for {term:?}"))?;
    for index in 0..2 {
        if !results.add_to_wishlist(index)? {
            tracing::info!(index, "result could not be wishlisted");
        }
    }
    let wishlist = ctx.open::<WishlistPage>()?;
    assume(!wishlist.is_wishlist_empty()?, "wishlist is empty after adding products")?;
    Ok(wishlist)
}

/// Whole-currency amount of a displayed price, ignoring symbols and separators
fn price_value(text: &str) -> Option<u64> {
    let digits: String = text
        .split('.')
        .next()
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Prices read in display order never decrease
fn is_ascending(prices: &[String]) -> bool {
    let values: Vec<u64> = prices.iter().filter_map(|p| price_value(p)).collect();
    values.len() == prices.len() && values.windows(2).all(|w| w[0] <= w[1])
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::{Settings, Timeouts};
    use crate::fixture::{storefront, FixtureProvider, StoreState, STOREFRONT_ORIGIN};
    use crate::harness::{Marker, ScenarioOutcome, SuiteRunner};
    use std::collections::BTreeSet;

    fn settings(dir: &std::path::Path) -> Settings {
        Settings::default()
            .with_base_url(format!("{STOREFRONT_ORIGIN}/"))
            .with_timeouts(Timeouts::uniform(80, 5))
            .with_output_dirs(dir.join("screenshots"), dir.join("reports"))
    }

    #[test]
    fn test_price_value_ignores_currency() {
        assert_eq!(price_value("Ksh 2,400"), Some(2400));
        assert_eq!(price_value("$19.99"), Some(19));
        assert_eq!(price_value("Calculated at checkout"), None);
    }

    #[test]
    fn test_ascending_prices() {
        let prices = |v: &[&str]| v.iter().map(ToString::to_string).collect::<Vec<_>>();
        assert!(is_ascending(&prices(&["Ksh 2,400", "Ksh 2,900", "Ksh 2,900"])));
        assert!(!is_ascending(&prices(&["Ksh 4,200", "Ksh 2,900"])));
        assert!(!is_ascending(&prices(&["Ksh 2,400", "sold out"])));
        assert!(is_ascending(&[]));
    }

    #[test]
    fn test_paths_are_unique() {
        let paths: Vec<String> = catalog().iter().map(Scenario::path).collect();
        let unique: BTreeSet<&String> = paths.iter().collect();
        assert_eq!(paths.len(), unique.len());
    }

    #[test]
    fn test_every_file_has_a_smoke_scenario() {
        let catalog = catalog();
        for file in files() {
            assert!(
                catalog.iter().any(|s| s.file == file && s.has_marker(Marker::Smoke)),
                "{file}"
            );
        }
    }

    #[test]
    fn test_area_markers_are_used() {
        let catalog = catalog();
        for marker in Marker::ALL {
            assert!(catalog.iter().any(|s| s.has_marker(marker)), "{marker}");
        }
    }

    #[test]
    fn test_suite_passes_against_storefront() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = settings(dir.path());
        let provider = FixtureProvider::new(storefront(), StoreState::default);
        let catalog = catalog();
        let report = SuiteRunner::new(&provider, &cfg).with_workers(4).run(&catalog);

        let problems: Vec<String> = report
            .failures()
            .iter()
            .map(|r| format!("{}: {}", r.path(), r.outcome))
            .collect();
        assert!(problems.is_empty(), "{problems:#?}");
        assert_eq!(report.total(), catalog.len());
        assert!(report.passed() > report.skipped());
        assert!(provider.quit_counts().iter().all(|&n| n == 1));

        let skipped: Vec<String> = report
            .results
            .iter()
            .filter(|r| matches!(r.outcome, ScenarioOutcome::Skipped(_)))
            .map(|r| r.path())
            .collect();
        assert!(skipped.contains(&"cart::test_shipping_calculator".to_string()));
    }
}
