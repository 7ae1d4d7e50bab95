use super::{is_ascending, wishlist_with_items};
use crate::harness::{assume, verify, verify_eq, Marker, Scenario, ScenarioContext};
use crate::page::{CartPage, HomePage, PageObject, ProductPage, ShopPage, WishlistPage};
use crate::result::VitrineResult;

const WISHLIST: &[Marker] = &[Marker::Wishlist];

pub(super) const SCENARIOS: &[Scenario] = &[
    Scenario::new("wishlist", "test_wishlist_page_loads", &[Marker::Wishlist, Marker::Smoke], page_loads),
    Scenario::new("wishlist", "test_wishlist_access_from_homepage", &[Marker::Wishlist, Marker::Navigation], access_from_home),
    Scenario::new("wishlist", "test_empty_wishlist_display", WISHLIST, empty_display),
    Scenario::new("wishlist", "test_add_product_to_wishlist", WISHLIST, add_product),
    Scenario::new("wishlist", "test_wishlist_item_display", WISHLIST, item_display),
    Scenario::new("wishlist", "test_add_to_cart_from_wishlist", &[Marker::Wishlist, Marker::Cart], add_to_cart),
    Scenario::new("wishlist", "test_remove_from_wishlist", WISHLIST, remove),
    Scenario::new("wishlist", "test_click_product_from_wishlist", WISHLIST, click_product),
    Scenario::new("wishlist", "test_continue_shopping_from_wishlist", WISHLIST, continue_shopping),
    Scenario::new("wishlist", "test_clear_wishlist", &[Marker::Wishlist, Marker::Regression], clear),
    Scenario::new("wishlist", "test_wishlist_sorting", WISHLIST, sorting),
    Scenario::new("wishlist", "test_share_wishlist", WISHLIST, share),
    Scenario::new("wishlist", "test_move_to_cart", &[Marker::Wishlist, Marker::Regression], move_to_cart),
    Scenario::new("wishlist", "test_add_all_to_cart", &[Marker::Wishlist, Marker::Cart], add_all_to_cart),
    Scenario::new("wishlist", "test_wishlist_count_display", WISHLIST, count_display),
];

fn page_loads(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let wishlist = ctx.open::<WishlistPage>()?;
    verify(wishlist.is_loaded()?, "wishlist page did not load")
}

fn access_from_home(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let home = ctx.open::<HomePage>()?;
    assume(home.click_wishlist_link()?, "no wishlist link in the header")?;
    verify(ctx.page::<WishlistPage>().is_loaded()?, "wishlist page did not load")
}

fn empty_display(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let wishlist = ctx.open::<WishlistPage>()?;
    assume(wishlist.is_wishlist_empty()?, "wishlist already holds items")?;
    verify(!wishlist.empty_message()?.is_empty(), "empty wishlist shows no message")
}

fn add_product(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let wishlist = wishlist_with_items(ctx)?;
    verify(wishlist.item_count()? >= 1, "no wishlist rows rendered")
}

fn item_display(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let wishlist = wishlist_with_items(ctx)?;
    let items = wishlist.wishlist_items()?;
    verify(!items.is_empty(), "wishlist rows could not be read")?;
    for item in &items {
        verify(!item.price.is_empty(), format!("{} has no price", item.name))?;
        verify(!item.link.is_empty(), format!("{} has no link", item.name))?;
    }
    Ok(())
}

fn add_to_cart(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let wishlist = wishlist_with_items(ctx)?;
    assume(wishlist.add_item_to_cart(0)?, "wishlist rows have no add to cart button")?;
    let cart = ctx.open::<CartPage>()?;
    verify(!cart.is_cart_empty()?, "cart is empty after adding from the wishlist")
}

fn remove(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let wishlist = wishlist_with_items(ctx)?;
    let before = wishlist.item_count()?;
    verify(wishlist.remove_item(0)?, "remove button not clickable")?;
    verify_eq(wishlist.item_count()?, before - 1, "rows after removing one")
}

fn click_product(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let wishlist = wishlist_with_items(ctx)?;
    verify(wishlist.click_product(0)?, "wishlist product link not clickable")?;
    verify(ctx.page::<ProductPage>().is_loaded()?, "product page did not load")
}

fn continue_shopping(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let wishlist = ctx.open::<WishlistPage>()?;
    assume(wishlist.continue_shopping()?, "no continue shopping link")?;
    verify(!wishlist.base().url_contains("wishlist")?, "still on the wishlist page")?;
    verify(ctx.page::<ShopPage>().is_loaded()?, "continue shopping did not open the shop")
}

fn clear(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let wishlist = wishlist_with_items(ctx)?;
    assume(wishlist.clear_wishlist()?, "wishlist cannot be cleared in one go")?;
    verify(wishlist.is_wishlist_empty()?, "wishlist still holds items after clearing")
}

fn sorting(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let wishlist = wishlist_with_items(ctx)?;
    let before = wishlist.item_count()?;
    assume(wishlist.sort_by("Price: low to high")?, "wishlist cannot be sorted")?;
    let prices: Vec<String> = wishlist.wishlist_items()?.into_iter().map(|i| i.price).collect();
    verify_eq(prices.len(), before, "rows after sorting")?;
    verify(is_ascending(&prices), format!("prices out of order: {prices:?}"))
}

fn share(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let wishlist = wishlist_with_items(ctx)?;
    assume(wishlist.share_wishlist()?, "wishlist has no share button")?;
    verify(wishlist.is_loaded()?, "wishlist page broke after sharing")
}

fn move_to_cart(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let wishlist = wishlist_with_items(ctx)?;
    let before = wishlist.item_count()?;
    assume(wishlist.move_item_to_cart(0)?, "wishlist rows have no move to cart button")?;
    verify_eq(wishlist.item_count()?, before - 1, "rows after moving one to the cart")?;
    let cart = ctx.open::<CartPage>()?;
    verify(!cart.is_cart_empty()?, "moved product missing from the cart")
}

fn add_all_to_cart(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let wishlist = wishlist_with_items(ctx)?;
    let saved = wishlist.item_count()?;
    verify(wishlist.add_all_to_cart()?, "some wishlist rows could not be added")?;
    let cart = ctx.open::<CartPage>()?;
    verify_eq(cart.item_count()?, saved, "cart lines after adding everything")
}

fn count_display(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let wishlist = wishlist_with_items(ctx)?;
    let shown = wishlist.count_display()?;
    assume(!shown.is_empty(), "wishlist shows no item count")?;
    let count = wishlist.item_count()?;
    verify(
        shown.contains(&count.to_string()),
        format!("count {shown:?} does not mention {count} rows"),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_every_scenario_is_tagged_wishlist() {
        assert!(SCENARIOS.iter().all(|s| s.has_marker(Marker::Wishlist)));
    }
}
