use std::time::Instant;

use crate::config::{PageKind, WindowSize};
use crate::harness::{verify, Marker, Scenario, ScenarioContext};
use crate::page::{HomePage, LoginPage, PageObject, SearchResultsPage};
use crate::result::VitrineResult;
use crate::test_data::InvalidData;

const ERROR_HANDLING: &[Marker] = &[Marker::ErrorHandling];

pub(super) const SCENARIOS: &[Scenario] = &[
    Scenario::new("error_handling", "test_invalid_url_handling", &[Marker::ErrorHandling, Marker::Smoke], invalid_urls),
    Scenario::new("error_handling", "test_form_validation_edge_cases", &[Marker::ErrorHandling, Marker::Login], form_validation),
    Scenario::new("error_handling", "test_cart_edge_cases", &[Marker::ErrorHandling, Marker::Cart], cart_quantities),
    Scenario::new("error_handling", "test_search_edge_cases", &[Marker::ErrorHandling, Marker::Search], search_terms),
    Scenario::new("error_handling", "test_window_resize_handling", ERROR_HANDLING, window_resize),
    Scenario::new("error_handling", "test_rapid_navigation", ERROR_HANDLING, rapid_navigation),
    Scenario::new("error_handling", "test_repeated_page_loads", &[Marker::ErrorHandling, Marker::Regression], repeated_loads),
];

const MISSING_PATHS: [&str; 4] = [
    "nonexistent-page",
    "products/nonexistent-product",
    "collections/nonexistent-collection",
    "pages/nonexistent-page",
];

const RESIZE_STEPS: [WindowSize; 3] = [
    WindowSize::new(800, 600),
    WindowSize::new(1024, 768),
    WindowSize::new(1920, 1080),
];

const REPEATED_LOADS: usize = 3;

fn invalid_urls(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let home = ctx.page::<HomePage>();
    for path in MISSING_PATHS {
        home.base().navigate(&ctx.settings().absolute_url(path))?;
        verify(home.base().is_error_page()?, format!("/{path} did not render an error page"))?;
    }
    home.load()?;
    verify(home.is_loaded()?, "home page did not recover after missing pages")
}

fn form_validation(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let oversized = InvalidData::oversized_email();
    let cases = [
        ("", "", "empty form"),
        (InvalidData::INVALID_EMAIL, "somepassword", "malformed email"),
        (oversized.as_str(), "somepassword", "oversized email"),
        (InvalidData::SCRIPT_INJECTION, InvalidData::SCRIPT_INJECTION, "script in fields"),
        (InvalidData::SQL_INJECTION, InvalidData::SQL_INJECTION, "sql in fields"),
    ];
    let login = ctx.page::<LoginPage>();
    for (email, password, what) in cases {
        login.load()?;
        let outcome = login.login_outcome(email, password, false)?;
        tracing::info!(%outcome, what, "login edge case");
        verify(!outcome.is_confirmed(), format!("{what} signed in: {outcome}"))?;
        verify(!login.base().is_error_page()?, format!("{what} broke the login page"))?;
    }
    Ok(())
}

fn cart_quantities(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let cart = super::cart_with_item(ctx)?;
    for raw in InvalidData::ODD_QUANTITIES {
        let entered = cart.enter_item_quantity(0, raw)?;
        tracing::info!(raw, entered, "odd quantity");
        verify(cart.is_loaded()?, format!("cart page lost after quantity {raw:?}"))?;
        verify(!cart.base().is_error_page()?, format!("quantity {raw:?} rendered an error page"))?;
        let items = cart.cart_items()?;
        verify(
            items.iter().all(|item| item.quantity > 0),
            format!("line without units kept after quantity {raw:?}"),
        )?;
    }
    Ok(())
}

fn search_terms(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let results = ctx.page::<SearchResultsPage>();
    let long = InvalidData::long_search_term();
    for term in InvalidData::ODD_SEARCH_TERMS.into_iter().chain([long.as_str()]) {
        let shown: String = term.chars().take(40).collect();
        results.search(term)?;
        verify(results.is_loaded()?, format!("search for {shown:?} did not load"))?;
        verify(
            !results.base().is_error_page()?,
            format!("search for {shown:?} rendered an error page"),
        )?;
    }
    Ok(())
}

fn window_resize(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let home = ctx.open::<HomePage>()?;
    for size in RESIZE_STEPS {
        home.base().set_window_size(size)?;
        verify(home.is_logo_visible()?, format!("logo hidden at {size}"))?;
        verify(home.is_navigation_visible()?, format!("no navigation at {size}"))?;
    }
    home.base().reset_window_size()
}

fn rapid_navigation(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let home = ctx.page::<HomePage>();
    for kind in [PageKind::Home, PageKind::Shop, PageKind::Cart, PageKind::Login, PageKind::Home] {
        home.base().open(kind)?;
    }
    verify(home.is_loaded()?, "home page did not settle after rapid navigation")
}

fn repeated_loads(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let home = ctx.page::<HomePage>();
    let budget = ctx.settings().timeouts().page_load();
    for attempt in 1..=REPEATED_LOADS {
        let started = Instant::now();
        home.load()?;
        let elapsed = started.elapsed();
        tracing::info!(attempt, ?elapsed, "home page load");
        verify(home.is_loaded()?, format!("load {attempt} did not render the home page"))?;
        verify(elapsed <= budget, format!("load {attempt} took {elapsed:?}"))?;
    }
    Ok(())
}
