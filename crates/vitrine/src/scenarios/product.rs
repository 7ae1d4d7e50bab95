use super::open_first_product;
use crate::harness::{assume, verify, verify_eq, Marker, Scenario, ScenarioContext};
use crate::page::{CartPage, PageObject, ProductTab, WishlistPage, MAX_RELATED};
use crate::result::VitrineResult;

const PRODUCT: &[Marker] = &[Marker::Product];

pub(super) const SCENARIOS: &[Scenario] = &[
    Scenario::new("product", "test_product_page_loads", &[Marker::Product, Marker::Smoke], page_loads),
    Scenario::new("product", "test_product_information_display", &[Marker::Product, Marker::Smoke], information),
    Scenario::new("product", "test_product_images", PRODUCT, images),
    Scenario::new(
        "product",
        "test_add_to_cart_functionality",
        &[Marker::Product, Marker::Smoke, Marker::Cart],
        add_to_cart,
    ),
    Scenario::new("product", "test_quantity_selection", PRODUCT, quantity_selection),
    Scenario::new("product", "test_product_variants", PRODUCT, variants),
    Scenario::new("product", "test_add_to_wishlist", &[Marker::Product, Marker::Wishlist], add_to_wishlist),
    Scenario::new("product", "test_product_tabs", PRODUCT, tabs),
    Scenario::new("product", "test_stock_status_display", PRODUCT, stock_status),
    Scenario::new("product", "test_product_reviews", &[Marker::Product, Marker::Regression], reviews),
    Scenario::new("product", "test_related_products", PRODUCT, related_products),
    Scenario::new("product", "test_buy_now_functionality", PRODUCT, buy_now),
    Scenario::new("product", "test_share_product", PRODUCT, share),
    Scenario::new("product", "test_product_sku_display", PRODUCT, sku),
];

fn page_loads(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let product = open_first_product(ctx)?;
    verify(product.is_loaded()?, "product page did not load")
}

fn information(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let product = open_first_product(ctx)?;
    let title = product.title()?;
    let price = product.price()?;
    tracing::info!(title, price, "product");
    verify(!title.is_empty(), "product has no title")?;
    verify(!price.is_empty(), "product has no price")
}

fn images(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let product = open_first_product(ctx)?;
    assume(product.click_thumbnail(0)?, "product has no thumbnails")?;
    verify(product.is_loaded()?, "product page broke after choosing a thumbnail")
}

fn add_to_cart(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let product = open_first_product(ctx)?;
    assume(product.is_in_stock()?, "product is out of stock")?;
    let outcome = product.add_to_cart_outcome()?;
    verify(outcome.is_accepted(), format!("add to cart refused: {outcome}"))?;
    let cart = ctx.open::<CartPage>()?;
    verify(!cart.is_cart_empty()?, "cart is empty after adding a product")
}

fn quantity_selection(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let product = open_first_product(ctx)?;
    assume(product.set_quantity(3)?, "product has no quantity field")?;
    verify_eq(product.quantity()?, 3, "quantity after typing")?;
    if product.increase_quantity()? {
        verify_eq(product.quantity()?, 4, "quantity after increasing")?;
    }
    if product.decrease_quantity()? {
        verify(product.quantity()? <= 4, "decrease raised the quantity")?;
    }
    Ok(())
}

fn variants(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let product = open_first_product(ctx)?;
    let size = product.select_size("38")?;
    let color = product.select_color("Black")?;
    tracing::info!(size, color, "variant selection");
    assume(size || color, "product has no selectable variants")?;
    verify(product.is_loaded()?, "product page broke after choosing a variant")
}

fn add_to_wishlist(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let product = open_first_product(ctx)?;
    let title = product.title()?;
    assume(product.add_to_wishlist()?, "product has no wishlist button")?;
    let wishlist = ctx.open::<WishlistPage>()?;
    let names: Vec<String> = wishlist.wishlist_items()?.into_iter().map(|i| i.name).collect();
    verify(
        names.iter().any(|n| n == &title),
        format!("{title} missing from wishlist {names:?}"),
    )
}

fn tabs(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let product = open_first_product(ctx)?;
    let mut switched = 0;
    for tab in ProductTab::ALL {
        if product.switch_tab(tab)? {
            switched += 1;
        }
    }
    assume(switched > 0, "product has no information tabs")?;
    product.switch_tab(ProductTab::Description)?;
    verify(!product.description()?.is_empty(), "description tab is empty")
}

fn stock_status(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let product = open_first_product(ctx)?;
    let status = product.stock_status()?;
    assume(!status.is_empty(), "product shows no stock status")?;
    let in_stock = product.is_in_stock()?;
    tracing::info!(status, in_stock, "stock");
    Ok(())
}

fn reviews(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let product = open_first_product(ctx)?;
    assume(product.switch_tab(ProductTab::Reviews)?, "product has no reviews tab")?;
    let reviews = product.reviews()?;
    assume(!reviews.is_empty(), "product has no reviews yet")?;
    for review in &reviews {
        verify(!review.rating.is_empty(), "review without rating")?;
        verify(!review.text.is_empty(), "review without text")?;
    }
    if product.write_review()? {
        tracing::info!("review form opened");
    }
    Ok(())
}

fn related_products(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let product = open_first_product(ctx)?;
    let related = product.related_products()?;
    assume(!related.is_empty(), "no related products")?;
    verify(related.len() <= MAX_RELATED, "too many related products read")?;
    let title = product.title()?;
    verify(
        related.iter().all(|p| p.title != title),
        "product lists itself as related",
    )
}

fn buy_now(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let product = open_first_product(ctx)?;
    assume(product.is_in_stock()?, "product is out of stock")?;
    assume(product.buy_now()?, "product has no buy now button")?;
    verify(
        product.base().url_contains("checkout")? || product.base().url_contains("cart")?,
        "buy now did not lead to checkout",
    )
}

fn share(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let product = open_first_product(ctx)?;
    assume(product.share_product()?, "product has no share button")?;
    verify(product.is_loaded()?, "product page broke after sharing")
}

fn sku(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let product = open_first_product(ctx)?;
    let sku = product.sku()?;
    assume(!sku.is_empty(), "product shows no SKU")?;
    verify(sku.chars().any(|c| c.is_ascii_alphanumeric()), format!("SKU looks empty: {sku:?}"))
}
