use super::{is_ascending, search_term};
use crate::harness::{assume, verify, Marker, Scenario, ScenarioContext};
use crate::page::{CartPage, Facet, PageObject, ProductPage, ResultsView, SearchResultsPage, WishlistPage};
use crate::result::VitrineResult;

const SEARCH: &[Marker] = &[Marker::Search];

pub(super) const SCENARIOS: &[Scenario] = &[
    Scenario::new("search", "test_basic_search", &[Marker::Search, Marker::Smoke], basic),
    Scenario::new("search", "test_search_results_display", &[Marker::Search, Marker::Smoke], results_display),
    Scenario::new("search", "test_search_query_display", SEARCH, query_display),
    Scenario::new("search", "test_search_results_count", SEARCH, results_count),
    Scenario::new("search", "test_multiple_search_terms", &[Marker::Search, Marker::Regression], multiple_terms),
    Scenario::new("search", "test_empty_search", SEARCH, empty_search),
    Scenario::new("search", "test_special_characters_search", SEARCH, special_characters),
    Scenario::new("search", "test_click_search_result", &[Marker::Search, Marker::Product], click_result),
    Scenario::new("search", "test_search_sorting", &[Marker::Search, Marker::Regression], sorting),
    Scenario::new("search", "test_search_filtering", SEARCH, filtering),
    Scenario::new("search", "test_clear_filters", SEARCH, clear_filters),
    Scenario::new("search", "test_search_pagination", SEARCH, pagination),
    Scenario::new("search", "test_results_per_page", SEARCH, results_per_page),
    Scenario::new("search", "test_view_options", SEARCH, view_options),
    Scenario::new("search", "test_add_to_cart_from_search", &[Marker::Search, Marker::Cart], add_to_cart),
    Scenario::new(
        "search",
        "test_add_to_wishlist_from_search",
        &[Marker::Search, Marker::Wishlist],
        add_to_wishlist,
    ),
];

/// Results for the first configured term, or a skip when there are none
fn searched<'s>(ctx: &ScenarioContext<'s>) -> VitrineResult<SearchResultsPage<'s>> {
    let term = search_term(ctx);
    let results = ctx.page::<SearchResultsPage>();
    results.search(&term)?;
    assume(results.has_results()?, format!("no products found for {term:?}"))?;
    Ok(results)
}

fn basic(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let term = search_term(ctx);
    let results = ctx.page::<SearchResultsPage>();
    results.search(&term)?;
    verify(results.is_loaded()?, "search page did not load")?;
    verify(results.has_results()?, format!("no results for {term:?}"))
}

fn results_display(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let results = searched(ctx)?.search_results()?;
    verify(!results.is_empty(), "results could not be read")?;
    for result in &results {
        verify(!result.price.is_empty(), format!("{} has no price", result.title))?;
        verify(!result.link.is_empty(), format!("{} has no link", result.title))?;
    }
    Ok(())
}

fn query_display(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let term = search_term(ctx);
    let results = searched(ctx)?;
    let shown = results.search_query()?;
    assume(!shown.is_empty(), "page does not echo the query")?;
    verify(
        shown.to_lowercase().contains(&term.to_lowercase()),
        format!("query shown as {shown:?}, searched {term:?}"),
    )
}

fn results_count(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let results = searched(ctx)?;
    let count = results.results_count_text()?;
    assume(!count.is_empty(), "page shows no result count")?;
    verify(
        count.chars().any(|c| c.is_ascii_digit()),
        format!("result count has no number: {count:?}"),
    )
}

fn multiple_terms(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let results = ctx.page::<SearchResultsPage>();
    let mut found = 0;
    for term in ctx.settings().search_terms() {
        results.search(term)?;
        verify(results.is_loaded()?, format!("search for {term:?} did not load"))?;
        let hit = results.has_results()?;
        if hit {
            found += 1;
        } else {
            let message = results.no_results_message()?;
            tracing::info!(%term, message, "no results");
        }
    }
    verify(found > 0, "none of the configured terms found anything")
}

fn empty_search(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let results = ctx.page::<SearchResultsPage>();
    results.search("")?;
    verify(!results.has_results()?, "empty search listed products")?;
    let message = results.no_results_message()?;
    tracing::info!(message, "empty search");
    Ok(())
}

fn special_characters(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let results = ctx.page::<SearchResultsPage>();
    results.search("@#$%^&*()")?;
    verify(results.is_loaded()?, "search page broke on special characters")?;
    verify(
        results.has_results()? || !results.no_results_message()?.is_empty(),
        "special characters produced neither results nor a message",
    )
}

fn click_result(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let results = searched(ctx)?;
    verify(results.click_product(0)?, "first result not clickable")?;
    verify(ctx.page::<ProductPage>().is_loaded()?, "product page did not load")
}

fn sorting(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let results = searched(ctx)?;
    assume(results.sort_by("Price, low to high")?, "results cannot be sorted by price")?;
    let prices: Vec<String> = results.search_results()?.into_iter().map(|r| r.price).collect();
    verify(!prices.is_empty(), "sorting emptied the results")?;
    verify(is_ascending(&prices), format!("prices out of order: {prices:?}"))
}

fn filtering(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let results = searched(ctx)?;
    let category = ctx
        .settings()
        .categories()
        .first()
        .cloned()
        .unwrap_or_else(|| "Dresses".to_string());
    let before = results.search_results()?.len();
    assume(
        results.apply_filter(Facet::Category, &category)?,
        format!("no {category} category filter"),
    )?;
    verify(results.is_loaded()?, "filtering broke the results page")?;
    let after = results.search_results()?.len();
    verify(after <= before, format!("filter grew the results from {before} to {after}"))
}

fn clear_filters(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let results = searched(ctx)?;
    let before = results.search_results()?.len();
    assume(results.clear_filters()?, "no clear filters control")?;
    verify(results.has_results()?, "clearing filters lost the results")?;
    let after = results.search_results()?.len();
    verify(after >= before, format!("clearing filters shrank the results from {before} to {after}"))
}

fn pagination(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let results = searched(ctx)?;
    assume(results.next_page()?, "results fit on one page")?;
    verify(results.current_page()? == 2, "next page did not advance to page 2")?;
    verify(results.previous_page()?, "previous page control missing")?;
    verify(results.current_page()? == 1, "previous page did not return to page 1")
}

fn results_per_page(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let results = searched(ctx)?;
    assume(results.set_results_per_page(24)?, "results per page cannot be changed")?;
    verify(results.search_results()?.len() <= 24, "more results shown than requested")
}

fn view_options(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let results = searched(ctx)?;
    let list = results.switch_view(ResultsView::List)?;
    let grid = results.switch_view(ResultsView::Grid)?;
    assume(list || grid, "no grid or list view controls")?;
    verify(results.has_results()?, "switching view hid the results")
}

fn add_to_cart(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let results = searched(ctx)?;
    assume(results.add_to_cart(0)?, "results have no add to cart button")?;
    let cart = ctx.open::<CartPage>()?;
    verify(!cart.is_cart_empty()?, "cart is empty after adding from search")
}

fn add_to_wishlist(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let results = searched(ctx)?;
    assume(results.add_to_wishlist(0)?, "results have no wishlist button")?;
    let wishlist = ctx.open::<WishlistPage>()?;
    verify(!wishlist.is_wishlist_empty()?, "wishlist is empty after adding from search")
}
