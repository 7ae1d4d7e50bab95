use super::is_ascending;
use crate::harness::{assume, verify, verify_eq, Marker, Scenario, ScenarioContext};
use crate::page::{CartPage, PageObject, ProductPage, ShoeSize, ShopCategory, ShopPage, SortOrder};
use crate::result::VitrineResult;

const SHOP: &[Marker] = &[Marker::Shop];

pub(super) const SCENARIOS: &[Scenario] = &[
    Scenario::new("shop", "test_shop_page_loads", &[Marker::Shop, Marker::Smoke], page_loads),
    Scenario::new("shop", "test_product_count_display", SHOP, count_display),
    Scenario::new("shop", "test_filter_by_category", SHOP, filter_by_category),
    Scenario::new("shop", "test_filter_by_size", SHOP, filter_by_size),
    Scenario::new("shop", "test_sort_by_price_ascending", &[Marker::Shop, Marker::Regression], sort_by_price),
    Scenario::new("shop", "test_shop_search", &[Marker::Shop, Marker::Search], search),
    Scenario::new("shop", "test_shop_pagination", SHOP, pagination),
    Scenario::new("shop", "test_click_product_by_name", &[Marker::Shop, Marker::Product], click_by_name),
    Scenario::new("shop", "test_add_first_product_to_cart", &[Marker::Shop, Marker::Cart], add_first_to_cart),
    Scenario::new("shop", "test_product_names_exclude_prices", SHOP, names_exclude_prices),
];

fn open<'s>(ctx: &ScenarioContext<'s>) -> VitrineResult<ShopPage<'s>> {
    let shop = ctx.open::<ShopPage>()?;
    assume(shop.is_shop_page_loaded()?, "shop listing not accessible")?;
    Ok(shop)
}

fn page_loads(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let shop = ctx.open::<ShopPage>()?;
    verify(shop.is_shop_page_loaded()?, "shop page did not load")?;
    verify(shop.has_products()?, "shop lists no products")
}

fn count_display(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let shop = open(ctx)?;
    let total = shop.total_product_count()?;
    let visible = shop.visible_product_count()?;
    let text = shop.products_count_text()?;
    tracing::info!(total, visible, text, "product count");
    assume(total > 0, "shop shows no product count")?;
    verify(visible <= total, format!("{visible} cards shown for {total} products"))
}

fn filter_by_category(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let shop = open(ctx)?;
    let before = shop.total_product_count()?;
    assume(shop.filter_by_category(ShopCategory::Heels)?, "no heels filter")?;
    verify(shop.has_products()?, "no heels listed")?;
    let after = shop.total_product_count()?;
    verify(after <= before, format!("filter grew the listing from {before} to {after}"))
}

fn filter_by_size(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let shop = open(ctx)?;
    assume(shop.filter_by_size(ShoeSize::new(38)?)?, "no size 38 filter")?;
    verify(
        shop.has_products()? || shop.has_no_products()?,
        "size filter left neither products nor a notice",
    )
}

fn sort_by_price(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let shop = open(ctx)?;
    assume(shop.sort_by(SortOrder::PriceLow)?, "listing cannot be sorted")?;
    let prices = shop.product_prices()?;
    verify(!prices.is_empty(), "no prices after sorting")?;
    verify(is_ascending(&prices), format!("prices out of order: {prices:?}"))
}

fn search(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let shop = open(ctx)?;
    assume(shop.search("sandals")?, "shop has no search box")?;
    verify(shop.has_products()?, "no sandals found")?;
    let names = shop.product_names()?;
    verify(
        names.iter().all(|n| n.to_lowercase().contains("sandal")),
        format!("unrelated products listed: {names:?}"),
    )
}

fn pagination(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let shop = open(ctx)?;
    verify_eq(shop.current_page_number()?, 1, "initial page")?;
    let first = shop.product_names()?;
    assume(shop.next_page()?, "listing fits on one page")?;
    verify_eq(shop.current_page_number()?, 2, "page after next")?;
    let second = shop.product_names()?;
    verify(second.iter().all(|n| !first.contains(n)), "page 2 repeats page 1")?;
    verify(shop.go_to_page(1)?, "page 1 link missing")?;
    verify_eq(shop.current_page_number()?, 1, "page after going back")
}

fn click_by_name(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let shop = open(ctx)?;
    let names = shop.product_names()?;
    let Some(name) = names.first() else {
        return assume(false, "shop lists no product names");
    };
    verify(shop.click_product_by_name(name)?, format!("{name} not clickable"))?;
    let product = ctx.page::<ProductPage>();
    verify(product.is_loaded()?, "product page did not load")?;
    verify_eq(product.title()?, name.clone(), "product title")
}

fn add_first_to_cart(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let shop = open(ctx)?;
    verify(shop.add_first_product_to_cart()?, "first product has no add to cart button")?;
    let cart = ctx.open::<CartPage>()?;
    verify(!cart.is_cart_empty()?, "cart is empty after adding from the shop")
}

fn names_exclude_prices(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let shop = open(ctx)?;
    let names = shop.product_names()?;
    let prices = shop.product_prices()?;
    verify(!names.is_empty(), "no product names read")?;
    verify(
        names.iter().all(|n| !prices.contains(n)),
        format!("prices mixed into names: {names:?}"),
    )
}
