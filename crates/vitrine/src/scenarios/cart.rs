use super::cart_with_item;
use crate::harness::{assume, verify, verify_eq, Marker, Scenario, ScenarioContext};
use crate::page::{CartPage, HomePage, PageObject};
use crate::result::VitrineResult;

const CART: &[Marker] = &[Marker::Cart];

pub(super) const SCENARIOS: &[Scenario] = &[
    Scenario::new("cart", "test_cart_page_loads", &[Marker::Cart, Marker::Smoke], page_loads),
    Scenario::new("cart", "test_empty_cart_display", &[Marker::Cart, Marker::Smoke], empty_cart),
    Scenario::new("cart", "test_cart_access_from_homepage", &[Marker::Cart, Marker::Navigation], access_from_home),
    Scenario::new("cart", "test_add_product_to_cart", CART, add_product),
    Scenario::new("cart", "test_cart_item_display", CART, item_display),
    Scenario::new("cart", "test_quantity_update", CART, quantity_update),
    Scenario::new("cart", "test_item_removal", CART, item_removal),
    Scenario::new("cart", "test_cart_totals_display", CART, totals),
    Scenario::new("cart", "test_checkout_button", CART, checkout),
    Scenario::new("cart", "test_continue_shopping_link", CART, continue_shopping),
    Scenario::new("cart", "test_coupon_application", &[Marker::Cart, Marker::Regression], coupon),
    Scenario::new("cart", "test_shipping_calculator", CART, shipping_calculator),
    Scenario::new("cart", "test_order_notes", CART, order_notes),
    Scenario::new("cart", "test_cart_persistence", &[Marker::Cart, Marker::Regression], persistence),
    Scenario::new("cart", "test_cart_validation_empty_state", CART, empty_state_validation),
];

fn page_loads(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let cart = ctx.open::<CartPage>()?;
    verify(cart.is_loaded()?, "cart page did not load")
}

fn empty_cart(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let cart = ctx.open::<CartPage>()?;
    assume(cart.is_cart_empty()?, "cart already holds items")?;
    verify(!cart.empty_cart_message()?.is_empty(), "empty cart shows no message")
}

fn access_from_home(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let home = ctx.open::<HomePage>()?;
    verify(home.click_cart_link()?, "cart link not clickable")?;
    verify(ctx.page::<CartPage>().is_loaded()?, "cart page did not load")
}

fn add_product(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let cart = cart_with_item(ctx)?;
    verify(cart.item_count()? >= 1, "no cart lines rendered")
}

fn item_display(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let cart = cart_with_item(ctx)?;
    let items = cart.cart_items()?;
    verify(!items.is_empty(), "cart lines could not be read")?;
    for item in &items {
        verify(!item.name.is_empty(), "cart line without a name")?;
        verify(!item.price.is_empty(), format!("{} has no price", item.name))?;
        verify(item.quantity >= 1, format!("{} has quantity {}", item.name, item.quantity))?;
    }
    Ok(())
}

fn quantity_update(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let cart = cart_with_item(ctx)?;
    assume(cart.update_item_quantity(0, 2)?, "quantity cannot be edited")?;
    let items = cart.cart_items()?;
    verify(!items.is_empty(), "cart emptied by a quantity update")?;
    verify_eq(items[0].quantity, 2, "quantity after update")?;
    if cart.increase_item_quantity(0)? {
        verify_eq(cart.cart_items()?[0].quantity, 3, "quantity after increasing")?;
    }
    if cart.decrease_item_quantity(0)? {
        verify_eq(cart.cart_items()?[0].quantity, 2, "quantity after decreasing")?;
    }
    Ok(())
}

fn item_removal(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let cart = cart_with_item(ctx)?;
    let before = cart.item_count()?;
    verify(cart.remove_item(0)?, "remove control not clickable")?;
    let after = cart.item_count()?;
    verify(after < before, format!("still {after} lines after removing one of {before}"))
}

fn totals(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let cart = cart_with_item(ctx)?;
    let subtotal = cart.subtotal()?;
    let total = cart.total()?;
    let shipping = cart.shipping()?;
    tracing::info!(subtotal, total, shipping, "cart totals");
    verify(!subtotal.is_empty() || !total.is_empty(), "cart shows no totals")
}

fn checkout(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let cart = cart_with_item(ctx)?;
    verify(cart.proceed_to_checkout()?, "checkout button not clickable")?;
    verify(cart.base().url_contains("checkout")?, "checkout button did not open checkout")
}

fn continue_shopping(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let cart = ctx.open::<CartPage>()?;
    assume(cart.continue_shopping()?, "no continue shopping link")?;
    verify(!cart.base().url_contains("cart")?, "still on the cart page")
}

fn coupon(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let cart = cart_with_item(ctx)?;
    let outcome = cart.apply_coupon_outcome("NOT-A-REAL-CODE")?;
    tracing::info!(%outcome, "bogus coupon");
    verify(!outcome.is_confirmed(), format!("bogus coupon applied: {outcome}"))
}

fn shipping_calculator(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let cart = cart_with_item(ctx)?;
    assume(
        cart.calculate_shipping(Some("Kenya"), Some("Nairobi"), Some("00100"))?,
        "cart has no shipping calculator",
    )?;
    verify(!cart.shipping()?.is_empty(), "no shipping quote shown")
}

fn order_notes(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let cart = cart_with_item(ctx)?;
    verify(cart.add_order_notes("Please gift wrap")?, "order notes not editable")
}

fn persistence(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let cart = cart_with_item(ctx)?;
    let before = cart.cart_items()?;
    cart.base().refresh()?;
    let after = cart.cart_items()?;
    verify_eq(after, before, "cart after reload")
}

fn empty_state_validation(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let cart = ctx.open::<CartPage>()?;
    assume(cart.is_cart_empty()?, "cart already holds items")?;
    verify_eq(cart.item_count()?, 0, "lines in an empty cart")?;
    let checkout = cart.proceed_to_checkout()?;
    tracing::info!(checkout, "checkout from an empty cart");
    Ok(())
}
