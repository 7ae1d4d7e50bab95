use std::time::Instant;

use crate::config::WindowSize;
use crate::harness::{assume, verify, Marker, Scenario, ScenarioContext};
use crate::page::{HomePage, PageObject, SearchResultsPage};
use crate::result::VitrineResult;
use crate::test_data::unique_email;

pub(super) const SCENARIOS: &[Scenario] = &[
    Scenario::new("home", "test_homepage_loads_successfully", &[Marker::Smoke], homepage_loads),
    Scenario::new("home", "test_logo_is_visible", &[Marker::Smoke], logo_is_visible),
    Scenario::new("home", "test_main_navigation_is_visible", &[Marker::Smoke, Marker::Navigation], main_navigation_is_visible),
    Scenario::new("home", "test_search_functionality_basic", &[Marker::Smoke, Marker::Search], search_basic),
    Scenario::new("home", "test_featured_products_display", &[], featured_products),
    Scenario::new("home", "test_cart_link_is_accessible", &[Marker::Smoke, Marker::Cart], cart_link),
    Scenario::new("home", "test_user_account_links", &[Marker::Login], account_links),
    Scenario::new("home", "test_hero_section_display", &[], hero_section),
    Scenario::new("home", "test_category_navigation", &[Marker::Regression, Marker::Navigation], category_navigation),
    Scenario::new("home", "test_footer_presence", &[], footer_presence),
    Scenario::new("home", "test_social_media_links", &[Marker::Regression], social_media_links),
    Scenario::new("home", "test_newsletter_signup_form", &[Marker::Regression], newsletter_signup),
    Scenario::new("home", "test_search_with_multiple_terms", &[Marker::Regression, Marker::Search], search_multiple_terms),
    Scenario::new("home", "test_responsive_elements", &[Marker::Regression], responsive_elements),
    Scenario::new("home", "test_page_load_performance", &[Marker::Smoke], page_load_performance),
];

fn homepage_loads(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let home = ctx.open::<HomePage>()?;
    verify(home.is_loaded()?, "home page did not load")?;
    verify(!home.base().title()?.is_empty(), "home page has no title")
}

fn logo_is_visible(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let home = ctx.open::<HomePage>()?;
    verify(home.is_logo_visible()?, "logo is not visible")
}

fn main_navigation_is_visible(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let home = ctx.open::<HomePage>()?;
    let links = home.navigation_links()?;
    tracing::info!(?links, "navigation");
    verify(!links.is_empty(), "main navigation has no links")
}

fn search_basic(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let home = ctx.open::<HomePage>()?;
    let term = super::search_term(ctx);
    verify(home.search_for_product(&term)?, format!("could not search for {term:?}"))?;
    verify(
        ctx.page::<SearchResultsPage>().is_loaded()?,
        "search results page did not load",
    )
}

fn featured_products(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let home = ctx.open::<HomePage>()?;
    let products = home.featured_products()?;
    assume(!products.is_empty(), "no featured products on the home page")?;
    verify(products.len() <= crate::page::MAX_FEATURED, "too many featured products read")?;
    for product in &products {
        verify(!product.title.is_empty(), "featured product without a title")?;
    }
    Ok(())
}

fn cart_link(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let home = ctx.open::<HomePage>()?;
    verify(home.click_cart_link()?, "cart link not clickable")?;
    verify(home.base().url_contains("cart")?, "cart link did not open the cart")
}

fn account_links(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let home = ctx.open::<HomePage>()?;
    verify(home.click_login_link()?, "login link not clickable")?;
    verify(home.base().url_contains("login")?, "login link did not open the login page")?;
    home.load()?;
    verify(home.click_register_link()?, "register link not clickable")?;
    verify(home.base().url_contains("register")?, "register link did not open registration")
}

fn hero_section(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let home = ctx.open::<HomePage>()?;
    assume(home.is_hero_section_visible()?, "home page has no hero section")?;
    verify(!home.hero_title()?.is_empty(), "hero section has no title")
}

fn category_navigation(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let home = ctx.page::<HomePage>();
    for category in ctx.settings().categories() {
        home.load()?;
        verify(
            home.click_product_category(category)?,
            format!("category {category} not reachable from the menu"),
        )?;
        verify(
            !home.base().title()?.contains("404"),
            format!("category {category} leads to a missing page"),
        )?;
    }
    Ok(())
}

fn footer_presence(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let home = ctx.open::<HomePage>()?;
    verify(home.is_footer_visible()?, "footer is not visible")
}

fn social_media_links(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let home = ctx.open::<HomePage>()?;
    let links = home.social_media_links()?;
    assume(!links.is_empty(), "no social media links")?;
    for link in &links {
        verify(link.starts_with("http"), format!("social link is not absolute: {link}"))?;
    }
    Ok(())
}

fn newsletter_signup(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let home = ctx.open::<HomePage>()?;
    verify(
        home.subscribe_to_newsletter(&unique_email("newsletter"))?,
        "newsletter form could not be submitted",
    )
}

fn search_multiple_terms(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let home = ctx.page::<HomePage>();
    let results = ctx.page::<SearchResultsPage>();
    for term in ctx.settings().search_terms().iter().take(3) {
        home.load()?;
        verify(home.search_for_product(term)?, format!("could not search for {term:?}"))?;
        verify(results.is_loaded()?, format!("no results page for {term:?}"))?;
    }
    Ok(())
}

fn responsive_elements(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let home = ctx.page::<HomePage>();
    let mut outcome = Ok(());
    for size in [WindowSize::MOBILE, WindowSize::TABLET] {
        home.base().set_window_size(size)?;
        outcome = header_fits(&home, size);
        if outcome.is_err() {
            break;
        }
    }
    home.base().reset_window_size()?;
    outcome
}

fn header_fits(home: &HomePage<'_>, size: WindowSize) -> VitrineResult<()> {
    home.load()?;
    verify(home.is_logo_visible()?, format!("logo hidden at {size}"))?;
    verify(home.is_navigation_visible()?, format!("no way to navigate at {size}"))
}

fn page_load_performance(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let home = ctx.page::<HomePage>();
    let budget = ctx.settings().timeouts().page_load();
    let started = Instant::now();
    home.load()?;
    let elapsed = started.elapsed();
    tracing::info!(?elapsed, ?budget, "home page load time");
    verify(home.is_loaded()?, "home page did not load")?;
    verify(elapsed <= budget, format!("home page took {elapsed:?}, budget {budget:?}"))
}
