use std::collections::BTreeSet;

use crate::config::{PageKind, WindowSize};
use crate::harness::{assume, verify, verify_eq, Marker, Scenario, ScenarioContext};
use crate::page::{
    CartPage, FooterLink, HomePage, LoginPage, PageObject, RegistrationPage, SearchResultsPage, ShopPage,
    WishlistPage, MAX_LINKS_CHECKED,
};
use crate::result::VitrineResult;

const NAVIGATION: &[Marker] = &[Marker::Navigation];

pub(super) const SCENARIOS: &[Scenario] = &[
    Scenario::new("navigation", "test_homepage_navigation", &[Marker::Navigation, Marker::Smoke], homepage),
    Scenario::new("navigation", "test_main_navigation_links", &[Marker::Navigation, Marker::Smoke], main_links),
    Scenario::new("navigation", "test_user_account_navigation", NAVIGATION, account_links),
    Scenario::new("navigation", "test_cart_and_wishlist_navigation", NAVIGATION, cart_and_wishlist),
    Scenario::new("navigation", "test_static_pages", NAVIGATION, static_pages),
    Scenario::new("navigation", "test_browser_back_navigation", &[Marker::Navigation, Marker::Regression], back),
    Scenario::new("navigation", "test_footer_navigation_links", NAVIGATION, footer_links),
    Scenario::new("navigation", "test_breadcrumb_navigation", NAVIGATION, breadcrumb_trail),
    Scenario::new("navigation", "test_search_across_pages", &[Marker::Navigation, Marker::Search], search_everywhere),
    Scenario::new("navigation", "test_mobile_menu", NAVIGATION, mobile_menu),
    Scenario::new("navigation", "test_core_pages_load", &[Marker::Navigation, Marker::Smoke], core_pages),
    Scenario::new("navigation", "test_cross_page_cart_consistency", &[Marker::Navigation, Marker::Cart], cart_badge_everywhere),
    Scenario::new("navigation", "test_page_refresh", NAVIGATION, refresh),
    Scenario::new("navigation", "test_404_error_handling", &[Marker::Navigation, Marker::ErrorHandling], not_found),
    Scenario::new("navigation", "test_responsive_design_across_pages", &[Marker::Navigation, Marker::Regression], responsive_pages),
    Scenario::new("navigation", "test_internal_links_work", &[Marker::Navigation, Marker::Regression], internal_links),
];

const CORE_PAGES: [PageKind; 6] = [
    PageKind::Home,
    PageKind::Shop,
    PageKind::Cart,
    PageKind::Login,
    PageKind::Register,
    PageKind::Wishlist,
];

const RESPONSIVE_PAGES: [PageKind; 4] = [PageKind::Home, PageKind::Shop, PageKind::Cart, PageKind::Wishlist];

fn homepage(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let home = ctx.open::<HomePage>()?;
    verify(home.is_loaded()?, "home page did not load")?;
    verify(!home.base().title()?.is_empty(), "home page has no title")?;
    verify(home.is_logo_visible()?, "logo not visible")
}

fn main_links(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let home = ctx.open::<HomePage>()?;
    let links = home.navigation_links()?;
    tracing::info!(?links, "main navigation");
    verify(!links.is_empty(), "main navigation is empty")?;
    verify(links.iter().all(|l| !l.is_empty()), "navigation link without a label")
}

fn account_links(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let home = ctx.open::<HomePage>()?;
    verify(home.click_login_link()?, "login link not clickable")?;
    verify(ctx.page::<LoginPage>().is_loaded()?, "login page did not load")?;

    home.load()?;
    assume(home.click_register_link()?, "no register link in the header")?;
    verify(ctx.page::<RegistrationPage>().is_loaded()?, "registration page did not load")
}

fn cart_and_wishlist(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let home = ctx.open::<HomePage>()?;
    verify(home.click_cart_link()?, "cart link not clickable")?;
    verify(ctx.page::<CartPage>().is_loaded()?, "cart page did not load")?;

    home.load()?;
    assume(home.click_wishlist_link()?, "no wishlist link in the header")?;
    verify(ctx.page::<WishlistPage>().is_loaded()?, "wishlist page did not load")
}

fn static_pages(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let home = ctx.page::<HomePage>();
    for kind in [PageKind::Contact, PageKind::About] {
        home.base().open(kind)?;
        let title = home.base().title()?;
        tracing::info!(page = ?kind, title, "static page");
        verify(!title.is_empty(), format!("{kind:?} page has no title"))?;
    }
    Ok(())
}

fn back(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let home = ctx.open::<HomePage>()?;
    let start = home.base().current_url()?;
    verify(home.click_login_link()?, "login link not clickable")?;
    verify(home.base().url_contains("login")?, "login link did not navigate")?;
    home.base().back()?;
    verify(!home.base().url_contains("login")?, "back did not leave the login page")?;
    verify(
        home.base().current_url()? == start,
        "back did not return to the home page",
    )
}

fn footer_links(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let home = ctx.page::<HomePage>();
    let mut followed = 0;
    for link in FooterLink::ALL {
        home.load()?;
        if !home.is_footer_link_visible(link)? {
            tracing::info!(link = link.label(), "footer link not offered");
            continue;
        }
        verify(home.click_footer_link(link)?, format!("{} link not clickable", link.label()))?;
        verify(
            !home.base().is_error_page()?,
            format!("{} link leads to an error page", link.label()),
        )?;
        followed += 1;
    }
    assume(followed > 0, "footer has none of the informational links")
}

fn breadcrumb_trail(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let product = super::open_first_product(ctx)?;
    let trail = product.base().breadcrumbs()?;
    tracing::info!(?trail, "breadcrumbs");
    assume(!trail.is_empty(), "product page has no breadcrumbs")?;
    verify(trail.len() >= 2, "breadcrumb trail has a single step")?;
    let before = product.base().current_url()?;
    verify(product.base().click_breadcrumb(&trail[0])?, format!("breadcrumb {:?} not clickable", trail[0]))?;
    verify(product.base().current_url()? != before, "breadcrumb did not navigate")?;
    verify(!product.base().is_error_page()?, "breadcrumb leads to an error page")
}

fn search_everywhere(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let term = super::search_term(ctx);
    let home = ctx.page::<HomePage>();
    for kind in [PageKind::Home, PageKind::Shop, PageKind::Cart] {
        home.base().open(kind)?;
        verify(home.search_for_product(&term)?, format!("no header search on {kind:?}"))?;
        verify(
            ctx.page::<SearchResultsPage>().is_loaded()?,
            format!("search from {kind:?} did not reach the results page"),
        )?;
    }
    Ok(())
}

fn mobile_menu(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let home = ctx.page::<HomePage>();
    home.base().set_window_size(WindowSize::MOBILE)?;
    let outcome = open_menu(&home);
    home.base().reset_window_size()?;
    outcome
}

fn open_menu(home: &HomePage<'_>) -> VitrineResult<()> {
    home.load()?;
    assume(home.is_menu_button_visible()?, "no collapsed menu at phone width")?;
    verify(home.open_mobile_menu()?, "menu button did not open the menu")
}

fn core_pages(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let home = ctx.page::<HomePage>();
    for kind in CORE_PAGES {
        home.base().open(kind)?;
        verify(!home.base().is_error_page()?, format!("{kind:?} page is an error page"))?;
        verify(!home.base().title()?.is_empty(), format!("{kind:?} page has no title"))?;
    }
    Ok(())
}

fn cart_badge_everywhere(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    super::cart_with_item(ctx)?;
    let home = ctx.open::<HomePage>()?;
    let expected = home.cart_item_count()?;
    assume(expected != "0", "cart badge does not count items")?;
    for kind in [PageKind::Shop, PageKind::Cart, PageKind::Wishlist] {
        home.base().open(kind)?;
        verify_eq(home.cart_item_count()?, expected.clone(), &format!("cart badge on {kind:?}"))?;
    }
    Ok(())
}

fn refresh(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let shop = ctx.open::<ShopPage>()?;
    let before = shop.base().current_url()?;
    shop.base().refresh()?;
    verify_eq(shop.base().current_url()?, before, "URL after refresh")?;
    verify(shop.is_loaded()?, "shop page did not come back after refresh")
}

fn not_found(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let home = ctx.page::<HomePage>();
    let url = ctx.settings().absolute_url("this-page-does-not-exist-404");
    home.base().navigate(&url)?;
    verify(home.base().is_error_page()?, "missing page did not render a not-found page")?;
    verify(home.is_logo_visible()?, "not-found page lost the site header")
}

fn responsive_pages(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let home = ctx.page::<HomePage>();
    let mut outcome = Ok(());
    for size in [WindowSize::MOBILE, WindowSize::TABLET, WindowSize::LAPTOP] {
        home.base().set_window_size(size)?;
        outcome = pages_render_at(&home, size);
        if outcome.is_err() {
            break;
        }
    }
    home.base().reset_window_size()?;
    outcome
}

fn pages_render_at(home: &HomePage<'_>, size: WindowSize) -> VitrineResult<()> {
    for kind in RESPONSIVE_PAGES {
        home.base().open(kind)?;
        verify(!home.base().is_error_page()?, format!("{kind:?} failed at {size}"))?;
        verify(home.is_logo_visible()?, format!("{kind:?} has no logo at {size}"))?;
        verify(home.is_navigation_visible()?, format!("{kind:?} has no navigation at {size}"))?;
    }
    Ok(())
}

fn internal_links(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let home = ctx.open::<HomePage>()?;
    let base_url = ctx.settings().base_url();
    let mut seen = BTreeSet::new();
    let links: Vec<_> = home
        .base()
        .links()?
        .into_iter()
        .filter(|link| link.is_internal(base_url) && seen.insert(link.href.clone()))
        .collect();
    assume(!links.is_empty(), "home page has no internal links")?;
    let report = home.base().verify_links(&links, MAX_LINKS_CHECKED)?;
    tracing::info!(checked = report.checked(), "internal links");
    verify(report.broken.is_empty(), format!("broken links: {:?}", report.broken))?;
    verify(report.errors.is_empty(), format!("links failed to load: {:?}", report.errors))
}
