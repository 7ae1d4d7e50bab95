//! Bundled demo storefront.
//!
//! A small fashion shop served from memory. The markup uses the class names
//! and ids the page objects look for, and every control a scenario drives
//! has a handler that updates [`StoreState`]. The CLI `fixture` backend and
//! the end-to-end tests run against it.

use std::collections::BTreeMap;

use super::document::{Effect, El, FixtureDocument, NodeId};
use super::session::{percent_encode, FixtureSite, Request};
use crate::page::{ShoeSize, ShopCategory, SortOrder};
use crate::test_data::{looks_like_email, UserRecord};

/// Origin the storefront is served under
pub const STOREFRONT_ORIGIN: &str = "https://vitrine.shop.test";

/// Shop name shown in titles
pub const STORE_NAME: &str = "Vitrine Demo Store";

/// Account that exists in every fresh [`StoreState`]
pub const DEMO_EMAIL: &str = "valid@example.com";
/// Password of [`DEMO_EMAIL`]
pub const DEMO_PASSWORD: &str = "Correct123!";

/// Discount code the cart accepts (10% off)
pub const DISCOUNT_CODE: &str = "WELCOME10";

/// Products per shop page
pub const SHOP_PAGE_SIZE: usize = 6;

/// Most units of one product a cart line holds
pub const MAX_LINE_QUANTITY: u32 = 99;

/// Widest viewport that gets the collapsed menu
pub const MOBILE_MAX_WIDTH: u32 = 767;

const MIN_PASSWORD_LEN: usize = 8;

const DEPARTMENTS: [&str; 5] = ["Dresses", "Shoes", "Bags", "Jewelry", "Accessories"];

/// A catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Product {
    pub sku: &'static str,
    pub slug: &'static str,
    pub name: &'static str,
    /// Price in whole shillings
    pub price: u32,
    pub department: &'static str,
    /// Shoe style, for products listed in the shop
    pub style: Option<ShopCategory>,
    pub sizes: &'static [u8],
    pub in_stock: bool,
    pub rating: u8,
}

impl Product {
    /// Path of the product page
    #[must_use]
    pub fn path(&self) -> String {
        format!("/products/{}", self.slug)
    }

    fn image(&self) -> String {
        format!("/assets/products/{}.jpg", self.slug)
    }

    fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        !term.is_empty()
            && (self.name.to_lowercase().contains(&term)
                || self.department.to_lowercase().contains(&term)
                || self.style.is_some_and(|s| s.label().to_lowercase().contains(&term)))
    }
}

const SHOE_SIZES: &[u8] = &[36, 37, 38, 39, 40, 41];
const WIDE_SIZES: &[u8] = &[35, 36, 37, 38, 39, 40, 41, 42];
const SNEAKER_SIZES: &[u8] = &[38, 39, 40, 41, 42, 44];
const NO_SIZES: &[u8] = &[];

/// Everything the shop sells, oldest first
pub static CATALOG: [Product; 13] = [
    Product { sku: "VS-001", slug: "floral-wrap-dress", name: "Floral Wrap Dress", price: 4_500, department: "Dresses", style: None, sizes: NO_SIZES, in_stock: true, rating: 5 },
    Product { sku: "VS-002", slug: "satin-midi-dress", name: "Satin Midi Dress", price: 5_200, department: "Dresses", style: None, sizes: NO_SIZES, in_stock: true, rating: 4 },
    Product { sku: "VS-003", slug: "classic-stiletto-heels", name: "Classic Stiletto Heels", price: 3_800, department: "Shoes", style: Some(ShopCategory::Heels), sizes: SHOE_SIZES, in_stock: true, rating: 5 },
    Product { sku: "VS-004", slug: "cork-wedge-sandals", name: "Cork Wedge Sandals", price: 3_200, department: "Shoes", style: Some(ShopCategory::Wedges), sizes: SHOE_SIZES, in_stock: true, rating: 4 },
    Product { sku: "VS-005", slug: "suede-ankle-boots", name: "Suede Ankle Boots", price: 6_500, department: "Shoes", style: Some(ShopCategory::Boots), sizes: WIDE_SIZES, in_stock: true, rating: 4 },
    Product { sku: "VS-006", slug: "strappy-flat-sandals", name: "Strappy Flat Sandals", price: 2_400, department: "Shoes", style: Some(ShopCategory::Sandals), sizes: SHOE_SIZES, in_stock: true, rating: 3 },
    Product { sku: "VS-007", slug: "leather-penny-loafers", name: "Leather Penny Loafers", price: 4_200, department: "Shoes", style: Some(ShopCategory::Loafers), sizes: WIDE_SIZES, in_stock: true, rating: 4 },
    Product { sku: "VS-008", slug: "canvas-sneakers", name: "Canvas Sneakers", price: 2_900, department: "Shoes", style: Some(ShopCategory::Sneakers), sizes: SNEAKER_SIZES, in_stock: true, rating: 5 },
    Product { sku: "VS-009", slug: "leather-tote-handbag", name: "Leather Tote Handbag", price: 5_800, department: "Bags", style: None, sizes: NO_SIZES, in_stock: true, rating: 5 },
    Product { sku: "VS-010", slug: "pearl-drop-earrings", name: "Pearl Drop Earrings", price: 1_500, department: "Jewelry", style: None, sizes: NO_SIZES, in_stock: true, rating: 4 },
    Product { sku: "VS-011", slug: "gold-layered-necklace", name: "Gold Layered Necklace", price: 2_100, department: "Jewelry", style: None, sizes: NO_SIZES, in_stock: true, rating: 3 },
    Product { sku: "VS-012", slug: "silk-print-scarf", name: "Silk Print Scarf", price: 1_200, department: "Accessories", style: None, sizes: NO_SIZES, in_stock: true, rating: 4 },
    Product { sku: "VS-013", slug: "patent-block-heels", name: "Patent Block Heels", price: 3_500, department: "Shoes", style: Some(ShopCategory::Heels), sizes: SHOE_SIZES, in_stock: false, rating: 4 },
];

/// Look a product up by SKU
#[must_use]
pub fn product(sku: &str) -> Option<&'static Product> {
    CATALOG.iter().find(|p| p.sku == sku)
}

/// One cart line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub sku: String,
    pub quantity: u32,
}

/// Mutable shop state carried by a fixture session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreState {
    /// Registered accounts, lowercase email to password
    pub accounts: BTreeMap<String, String>,
    pub signed_in: Option<String>,
    pub cart: Vec<CartLine>,
    /// SKUs, in the order they were added
    pub wishlist: Vec<String>,
    pub discount: Option<String>,
    pub order_notes: String,
    pub subscribers: Vec<String>,
    pub reset_requests: Vec<String>,
}

impl Default for StoreState {
    fn default() -> Self {
        let test_user = UserRecord::default_test_user();
        let accounts = [
            (DEMO_EMAIL.to_string(), DEMO_PASSWORD.to_string()),
            (test_user.email.to_lowercase(), test_user.password),
        ]
        .into_iter()
        .collect();
        Self {
            accounts,
            signed_in: None,
            cart: Vec::new(),
            wishlist: Vec::new(),
            discount: None,
            order_notes: String::new(),
            subscribers: Vec::new(),
            reset_requests: Vec::new(),
        }
    }
}

impl StoreState {
    /// Same state with `quantity` of `sku` in the cart
    #[must_use]
    pub fn with_cart(mut self, sku: &str, quantity: u32) -> Self {
        self.add_to_cart(sku, quantity);
        self
    }

    /// Same state with `sku` on the wishlist
    #[must_use]
    pub fn with_wishlist(mut self, sku: &str) -> Self {
        self.add_to_wishlist(sku);
        self
    }

    /// Total units in the cart
    #[must_use]
    pub fn cart_quantity(&self) -> u32 {
        self.cart.iter().map(|l| l.quantity).sum()
    }

    /// Add units of a known product; unknown SKUs are ignored
    pub fn add_to_cart(&mut self, sku: &str, quantity: u32) {
        if product(sku).is_none() || quantity == 0 {
            return;
        }
        match self.cart.iter_mut().find(|l| l.sku == sku) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity).min(MAX_LINE_QUANTITY),
            None => self.cart.push(CartLine {
                sku: sku.to_string(),
                quantity: quantity.min(MAX_LINE_QUANTITY),
            }),
        }
    }

    /// Set the quantity of a line, zero removes it
    pub fn set_quantity(&mut self, sku: &str, quantity: u32) {
        if quantity == 0 {
            self.cart.retain(|l| l.sku != sku);
        } else if let Some(line) = self.cart.iter_mut().find(|l| l.sku == sku) {
            line.quantity = quantity.min(MAX_LINE_QUANTITY);
        }
    }

    pub fn add_to_wishlist(&mut self, sku: &str) {
        if product(sku).is_some() && !self.wishlist.iter().any(|s| s == sku) {
            self.wishlist.push(sku.to_string());
        }
    }

    /// Cart value before discounts
    #[must_use]
    pub fn subtotal(&self) -> u32 {
        self.cart
            .iter()
            .filter_map(|l| product(&l.sku).map(|p| p.price * l.quantity))
            .sum()
    }

    /// Cart value after the discount code
    #[must_use]
    pub fn total(&self) -> u32 {
        let subtotal = self.subtotal();
        if self.discount.is_some() {
            subtotal - subtotal / 10
        } else {
            subtotal
        }
    }
}

/// `Ksh 3,800`
fn ksh(amount: u32) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("Ksh {grouped}")
}

/// The demo shop with all of its routes
#[must_use]
pub fn storefront() -> FixtureSite<StoreState> {
    let mut site = FixtureSite::new(STOREFRONT_ORIGIN)
        .page("/", |_, s| home(s))
        .page("/account/login", |_, s| login(s))
        .page("/account/register", |_, s| register(s))
        .page("/account/recover", |_, s| recover(s))
        .page("/account", |_, s| account(s))
        .page("/account/wishlist", wishlist)
        .page("/cart", |_, s| cart(s))
        .page("/checkout", |_, s| checkout(s))
        .page("/search", search)
        .page("/shop", shop)
        .page("/pages/contact-us", |_, s| {
            info_page(s, "Contact us", "Call us on +254 700 000 000 or write to hello@vitrine.shop.test.")
        })
        .page("/pages/about-us", |_, s| {
            info_page(s, "About us", "Shoes, bags and dresses picked in Nairobi since 2015.")
        })
        .page("/pages/privacy-policy", |_, s| {
            info_page(s, "Privacy policy", "We only use your details to fulfil orders.")
        })
        .page("/pages/terms-of-service", |_, s| {
            info_page(s, "Terms of service", "Returns are accepted within 14 days of delivery.")
        })
        .not_found(|_, s| not_found(s));
    for department in DEPARTMENTS {
        site = site.page(&format!("/collections/{}", department.to_lowercase()), move |_, s| {
            collection(s, department)
        });
    }
    for item in &CATALOG {
        site = site.page(&item.path(), move |_, s| product_page(s, item));
    }
    site
}

fn layout(title: &str, state: &StoreState, main: El, footer: El) -> FixtureDocument<StoreState> {
    let title = if title.is_empty() {
        STORE_NAME.to_string()
    } else {
        format!("{title} | {STORE_NAME}")
    };
    FixtureDocument::new(title)
        .with(header(state))
        .with(El::new("main").id("main").child(main))
        .with(footer)
        .on_click("search-go", submit_search)
        .on_enter("search-q", submit_search)
        .on_click("menu-toggle", |_, _, _| vec![Effect::Show("mobile-nav".into())])
}

fn header(state: &StoreState) -> El {
    let logo = El::div("header__logo").child(
        El::link("/", "").child(
            El::new("img")
                .attr("src", "/assets/logo.png")
                .attr("alt", "Vitrine logo"),
        ),
    );
    let nav_links = || {
        DEPARTMENTS
            .iter()
            .map(|d| El::link(&format!("/collections/{}", d.to_lowercase()), d))
            .chain([El::link("/shop", "Shop")])
    };
    let nav = El::new("nav")
        .class("main-nav")
        .min_width(MOBILE_MAX_WIDTH + 1)
        .children(nav_links());
    let menu = El::button("Menu")
        .id("menu-toggle")
        .class("menu-toggle")
        .attr("aria-label", "Open menu")
        .max_width(MOBILE_MAX_WIDTH);
    let mobile_nav = El::new("nav")
        .id("mobile-nav")
        .class("mobile-nav")
        .hidden()
        .children(nav_links());
    let search = El::div("header__search").children([
        El::input("text")
            .id("search-q")
            .class("search__input")
            .attr("name", "q")
            .attr("placeholder", "Search products"),
        El::button("Search")
            .id("search-go")
            .class("search__submit")
            .attr("type", "button"),
    ]);
    let account = match &state.signed_in {
        Some(_) => vec![El::link("/account", "My Account").class("header__account")],
        None => vec![
            El::link("/account/login", "Login").class("header__login"),
            El::link("/account/register", "Register").class("header__register"),
        ],
    };
    El::new("header")
        .class("header")
        .children([logo, nav, menu, mobile_nav, search])
        .children(account)
        .child(El::link("/account/wishlist", "Wishlist").class("wishlist-link"))
        .child(
            El::link("/cart", "Cart").class("header__cart").child(
                El::new("span")
                    .id("cart-count")
                    .class("cart-count")
                    .text(&state.cart_quantity().to_string()),
            ),
        )
}

fn footer(newsletter: bool) -> El {
    let mut footer = El::new("footer").class("footer").children([
        El::div("social-links").children([
            El::link("https://facebook.com/vitrineshop", "Facebook"),
            El::link("https://instagram.com/vitrineshop", "Instagram"),
            El::link("https://twitter.com/vitrineshop", "Twitter"),
        ]),
        El::link("/pages/contact-us", "Contact").class("footer__contact"),
        El::link("/pages/about-us", "About Us").class("footer__about"),
        El::link("/pages/privacy-policy", "Privacy Policy").class("footer__privacy"),
        El::link("/pages/terms-of-service", "Terms of Service").class("footer__terms"),
    ]);
    if newsletter {
        footer = footer.child(El::div("newsletter").children([
            El::input("email").id("newsletter-email").class("newsletter__input"),
            El::button("Subscribe")
                .id("newsletter-submit")
                .class("newsletter__submit")
                .attr("type", "button"),
            El::div("newsletter__message").id("newsletter-message").hidden(),
        ]));
    }
    footer
}

fn submit_search(doc: &FixtureDocument<StoreState>, _: NodeId, _: &mut StoreState) -> Vec<Effect> {
    let term = doc.value_of("search-q");
    vec![Effect::Navigate(format!("/search?q={}", percent_encode(term.trim())))]
}

fn subscribe(doc: &FixtureDocument<StoreState>, _: NodeId, state: &mut StoreState) -> Vec<Effect> {
    let email = doc.value_of("newsletter-email").trim().to_string();
    let message = if looks_like_email(&email) {
        state.subscribers.push(email);
        "Thanks for subscribing!"
    } else {
        "Please enter a valid email address."
    };
    vec![
        Effect::SetText("newsletter-message".into(), message.into()),
        Effect::Show("newsletter-message".into()),
    ]
}

/// `Home / ... / current`, every step but the last linked
fn breadcrumbs(steps: &[(&str, &str)], current: &str) -> El {
    El::div("breadcrumbs")
        .attr("aria-label", "breadcrumb")
        .child(El::link("/", "Home"))
        .children(steps.iter().map(|(href, label)| El::link(href, label)))
        .child(El::new("span").class("breadcrumbs__current").text(current))
}

fn image_of(item: &Product) -> El {
    El::new("img").attr("src", &item.image()).attr("alt", item.name)
}

/// Card used on the home page and collections
fn product_card(item: &Product) -> El {
    El::div("product-card").attr("data-sku", item.sku).children([
        El::div("product-card__image").child(El::link(&item.path(), "").child(image_of(item))),
        El::link(&item.path(), item.name).class("product-card__title"),
        El::new("span")
            .class("product-card__price")
            .text(&ksh(item.price)),
    ])
}

/// Grid item used by search results, wishlist rows and related products
fn product_item(item: &Product, class: &str) -> El {
    El::div(class).attr("data-sku", item.sku).children([
        El::link(&item.path(), "")
            .class("product__link")
            .child(El::div("product__image").child(image_of(item))),
        El::new("h3").class("product__title").text(item.name),
        El::new("span").class("product__price").text(&ksh(item.price)),
    ])
}

fn home(state: &StoreState) -> FixtureDocument<StoreState> {
    let hero = El::div("hero").children([
        El::new("h2").class("hero__title").text("New season heels"),
        El::link("/shop", "Shop now").class("hero__cta"),
    ]);
    let featured = El::div("featured-products")
        .child(El::new("h2").text("Featured products"))
        .children(CATALOG.iter().filter(|p| p.in_stock).take(8).map(product_card));
    layout("", state, El::div("home").children([hero, featured]), footer(true))
        .on_click("newsletter-submit", subscribe)
}

fn collection(state: &StoreState, department: &str) -> FixtureDocument<StoreState> {
    let main = El::div("collection")
        .child(breadcrumbs(&[("/shop", "Shop")], department))
        .child(El::new("h1").class("page-title").text(department))
        .children(
            CATALOG
                .iter()
                .filter(|p| p.department == department)
                .map(product_card),
        );
    layout(department, state, main, footer(false))
}

fn info_page(state: &StoreState, title: &str, body: &str) -> FixtureDocument<StoreState> {
    let main = El::div("page").children([
        El::new("h1").class("page-title").text(title),
        El::new("p").text(body),
    ]);
    layout(title, state, main, footer(false))
}

fn not_found(state: &StoreState) -> FixtureDocument<StoreState> {
    let main = El::div("template-404").children([
        El::new("h1").class("not-found").text("Page not found"),
        El::link("/shop", "Continue shopping").class("continue-shopping"),
    ]);
    layout("404 Not Found", state, main, footer(false))
}

fn login(state: &StoreState) -> FixtureDocument<StoreState> {
    let form = El::new("form").id("customer_login").children([
        El::input("email").id("customer_email").attr("name", "email"),
        El::input("password").id("customer_password").attr("name", "password"),
        El::new("label").text("Remember me").child(El::input("checkbox").id("remember_me").attr("name", "remember")),
        El::link("/account/recover", "Forgot your password?"),
        El::link("/account/register", "Create account"),
        El::div("error").id("login-error").hidden(),
        El::button("Sign In").id("login-submit").attr("type", "submit"),
    ]);
    let main = El::div("login")
        .child(El::new("h1").class("login-title").text("Login"))
        .child(form);
    layout("Account", state, main, footer(false)).on_click("login-submit", submit_login)
}

fn submit_login(doc: &FixtureDocument<StoreState>, _: NodeId, state: &mut StoreState) -> Vec<Effect> {
    let email = doc.value_of("customer_email").trim().to_lowercase();
    let password = doc.value_of("customer_password");
    let error = if email.is_empty() {
        "Email required"
    } else if password.is_empty() {
        "Password required"
    } else if state.accounts.get(&email) == Some(&password) {
        state.signed_in = Some(email);
        return vec![Effect::Navigate("/account".into())];
    } else {
        "Incorrect email or password."
    };
    vec![
        Effect::SetText("login-error".into(), error.into()),
        Effect::Show("login-error".into()),
    ]
}

fn account(state: &StoreState) -> FixtureDocument<StoreState> {
    let main = match &state.signed_in {
        Some(email) => El::div("account").children([
            El::new("h1").class("page-title").text("My Account"),
            El::div("alert-success").text(&format!("Signed in as {email}")),
            El::link("/account/wishlist", "My wishlist"),
            El::link("/", "Log out").id("logout"),
        ]),
        None => El::div("account").children([
            El::new("h1").class("page-title").text("My Account"),
            El::new("p").text("Please log in to see your account."),
            El::link("/account/login", "Log in"),
        ]),
    };
    layout("My Account", state, main, footer(false)).on_click("logout", |_, _, state| {
        state.signed_in = None;
        vec![Effect::Navigate("/".into())]
    })
}

fn register(state: &StoreState) -> FixtureDocument<StoreState> {
    let form = El::new("form").id("create_customer").children([
        El::input("text").id("customer_first_name").attr("name", "first_name"),
        El::input("text").id("customer_last_name").attr("name", "last_name"),
        El::input("email").id("register_email").attr("name", "email"),
        El::new("span").class("field-error").id("email-error").hidden(),
        El::input("password").id("register_password").attr("name", "password"),
        El::new("span").class("field-error").id("password-error").hidden(),
        El::input("tel").id("customer_phone").attr("name", "phone"),
        El::input("checkbox").id("agree_terms").attr("name", "terms"),
        El::input("checkbox").id("newsletter").attr("name", "newsletter"),
        El::link("/account/login", "Already have an account? Log in"),
        El::div("errors").id("register-error").hidden(),
        El::button("Create").id("register-submit").attr("type", "submit"),
    ]);
    let main = El::div("register")
        .child(El::new("h1").class("page-title").text("Create Account"))
        .child(form);
    layout("Create Account", state, main, footer(false)).on_click("register-submit", submit_registration)
}

fn submit_registration(
    doc: &FixtureDocument<StoreState>,
    _: NodeId,
    state: &mut StoreState,
) -> Vec<Effect> {
    let email = doc.value_of("register_email").trim().to_lowercase();
    let password = doc.value_of("register_password");
    let mut effects = vec![
        Effect::Hide("email-error".into()),
        Effect::Hide("password-error".into()),
    ];
    let mut field_error = |id: &str, text: &str| {
        effects.push(Effect::SetText(id.into(), text.into()));
        effects.push(Effect::Show(id.into()));
    };
    let problem = if !looks_like_email(&email) {
        field_error("email-error", "Enter a valid email address");
        Some("Please correct the errors below.")
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        field_error("password-error", "Password is too short (minimum is 8 characters)");
        Some("Please correct the errors below.")
    } else if state.accounts.contains_key(&email) {
        Some("This email address is already associated with an account.")
    } else if !doc.is_checked("agree_terms") {
        Some("You must accept the terms and conditions.")
    } else {
        None
    };
    if let Some(message) = problem {
        effects.push(Effect::SetText("register-error".into(), message.into()));
        effects.push(Effect::Show("register-error".into()));
        return effects;
    }
    state.accounts.insert(email.clone(), password);
    state.signed_in = Some(email);
    vec![Effect::Navigate("/account".into())]
}

fn recover(state: &StoreState) -> FixtureDocument<StoreState> {
    let form = El::new("form").id("recover_customer_password").children([
        El::input("email").id("recover_email").attr("name", "email"),
        El::div("form__message--success").id("recover-success").hidden(),
        El::div("form__message--error").id("recover-error").hidden(),
        El::link("/account/login", "Back to login"),
        El::link("/account/register", "Register"),
        El::button("Submit").id("recover-submit").attr("type", "submit"),
    ]);
    let main = El::div("recover").children([
        El::new("h1").class("page-title").text("Reset your password"),
        El::new("p")
            .class("instructions")
            .text("We will send you an email to reset your password."),
        form,
    ]);
    layout("Reset password", state, main, footer(false)).on_click("recover-submit", |doc, _, state| {
        let email = doc.value_of("recover_email").trim().to_lowercase();
        if !looks_like_email(&email) {
            return vec![
                Effect::Hide("recover-success".into()),
                Effect::SetText("recover-error".into(), "Please enter a valid email address.".into()),
                Effect::Show("recover-error".into()),
            ];
        }
        state.reset_requests.push(email);
        vec![
            Effect::Hide("recover-error".into()),
            Effect::SetText(
                "recover-success".into(),
                "We've sent you an email with a link to update your password.".into(),
            ),
            Effect::Show("recover-success".into()),
        ]
    })
}

fn product_page(state: &StoreState, item: &'static Product) -> FixtureDocument<StoreState> {
    let mut purchase = El::div("product__form");
    if !item.sizes.is_empty() {
        let sizes: Vec<String> = item.sizes.iter().map(u8::to_string).collect();
        let labels: Vec<&str> = sizes.iter().map(String::as_str).collect();
        purchase = purchase.child(El::select(&labels).id("size-select").attr("name", "options[size]"));
    }
    purchase = purchase.children([
        El::select(&["Black", "Nude", "Red"]).id("color-select").attr("name", "options[color]"),
        El::button("-").id("qty-minus").class("quantity__button--decrease"),
        El::input("number").id("quantity").attr("name", "quantity").attr("value", "1"),
        El::button("+").id("qty-plus").class("quantity__button--increase"),
    ]);
    let mut add = El::button("Add to cart")
        .id("product-add")
        .class("btn--add-to-cart")
        .attr("name", "add");
    if !item.in_stock {
        add = add.disabled();
    }
    let stock = if item.in_stock {
        El::new("span").class("in-stock").text("In stock")
    } else {
        El::new("span").class("out-of-stock").text("Sold out")
    };
    let tabs = El::div("product__tabs").children(["description", "specifications", "reviews", "shipping"].map(|tab| {
        El::button(tab).attr("data-tab", tab).attr("data-action", "tab")
    }));
    let panels = El::div("product__panels").children([
        El::div("product__description")
            .id("tab-description")
            .text(&format!("{} from our {} collection.", item.name, item.department.to_lowercase())),
        El::div("product__specs").id("tab-specifications").hidden().text(&format!("SKU {}", item.sku)),
        El::div("reviews").id("tab-reviews").hidden().children([
            El::div("review").children([
                El::new("span").class("review__rating").text(&item.rating.to_string()),
                El::new("p").class("review__text").text("Lovely fit and fast delivery."),
            ]),
            El::button("Write a review").id("write-review").class("write-review"),
            El::div("review-form").id("review-form").hidden(),
        ]),
        El::div("product__shipping").id("tab-shipping").hidden().text("Delivery within Nairobi in 2 days."),
    ]);
    let related = El::div("related-products").children(
        CATALOG
            .iter()
            .filter(|p| p.department == item.department && p.sku != item.sku)
            .take(4)
            .map(|p| product_item(p, "product-item")),
    );
    let department_path = format!("/collections/{}", item.department.to_lowercase());
    let main = El::div("product").attr("data-sku", item.sku).children([
        breadcrumbs(&[("/shop", "Shop"), (department_path.as_str(), item.department)], item.name),
        El::div("product__media").children([
            image_of(item),
            El::div("product__thumbnails").children((1..=3).map(|n| {
                El::new("img").attr("src", &format!("/assets/products/{}-{n}.jpg", item.slug))
            })),
        ]),
        El::new("h1").class("product__title").text(item.name),
        El::new("span").class("product__price").text(&ksh(item.price)),
        El::new("p").class("product__sku").text(&format!("SKU: {}", item.sku)),
        El::div("product__stock").child(stock),
        purchase,
        add,
        El::button("Buy it now").id("buy-now").class("buy-now"),
        El::button("Add to wishlist").id("product-wishlist").class("add-to-wishlist"),
        El::button("Share").id("share-product").class("share-product"),
        El::div("share-panel").id("share-panel").hidden().text("Copy link"),
        El::div("alert-success").id("product-notice").hidden(),
        tabs,
        panels,
        related,
    ]);
    let sku = item.sku;
    layout(item.name, state, main, footer(false))
        .on_click("qty-plus", |doc, _, _| {
            let quantity = quantity_of(doc);
            vec![Effect::SetValue("quantity".into(), (quantity + 1).to_string())]
        })
        .on_click("qty-minus", |doc, _, _| {
            let quantity = quantity_of(doc).saturating_sub(1).max(1);
            vec![Effect::SetValue("quantity".into(), quantity.to_string())]
        })
        .on_click("product-add", move |doc, _, state| {
            state.add_to_cart(sku, quantity_of(doc));
            vec![
                Effect::SetText("cart-count".into(), state.cart_quantity().to_string()),
                Effect::SetText("product-notice".into(), "Added to cart".into()),
                Effect::Show("product-notice".into()),
            ]
        })
        .on_click("buy-now", move |doc, _, state| {
            state.add_to_cart(sku, quantity_of(doc));
            vec![Effect::Navigate("/checkout".into())]
        })
        .on_click("product-wishlist", move |_, _, state| {
            state.add_to_wishlist(sku);
            vec![
                Effect::SetText("product-notice".into(), "Added to wishlist".into()),
                Effect::Show("product-notice".into()),
            ]
        })
        .on_click("share-product", |_, _, _| vec![Effect::Show("share-panel".into())])
        .on_click("write-review", |_, _, _| vec![Effect::Show("review-form".into())])
        .on_click("tab", |doc, node, _| {
            let Some(tab) = doc.attr_of(node, "data-tab") else {
                return Vec::new();
            };
            ["description", "specifications", "reviews", "shipping"]
                .into_iter()
                .map(|name| {
                    let panel = format!("tab-{name}");
                    if name == tab {
                        Effect::Show(panel)
                    } else {
                        Effect::Hide(panel)
                    }
                })
                .collect()
        })
}

fn quantity_of(doc: &FixtureDocument<StoreState>) -> u32 {
    doc.value_of("quantity").trim().parse().unwrap_or(1).max(1)
}

fn sku_of(doc: &FixtureDocument<StoreState>, node: NodeId) -> String {
    doc.attr_of(node, "data-sku").unwrap_or_default()
}

fn add_to_cart(doc: &FixtureDocument<StoreState>, node: NodeId, state: &mut StoreState) -> Vec<Effect> {
    state.add_to_cart(&sku_of(doc, node), 1);
    vec![Effect::Reload]
}

fn add_to_wishlist(doc: &FixtureDocument<StoreState>, node: NodeId, state: &mut StoreState) -> Vec<Effect> {
    state.add_to_wishlist(&sku_of(doc, node));
    vec![Effect::Reload]
}

fn cart(state: &StoreState) -> FixtureDocument<StoreState> {
    let heading = El::new("h1").class("page-title").text("Your cart");
    if state.cart.is_empty() {
        let main = El::div("cart").children([
            heading,
            El::div("empty-cart").text("Your cart is currently empty."),
            El::link("/shop", "Continue shopping").class("continue-shopping"),
        ]);
        return layout("Your cart", state, main, footer(false));
    }
    let lines = state.cart.iter().filter_map(|line| {
        let item = product(&line.sku)?;
        Some(El::div("cart-item").attr("data-sku", item.sku).children([
            El::div("cart-item__image").child(image_of(item)),
            El::link(&item.path(), item.name).class("cart-item__title"),
            El::new("span").class("cart-item__price").text(&ksh(item.price)),
            El::button("-")
                .class("qty-minus")
                .attr("data-action", "cart-minus")
                .attr("data-sku", item.sku),
            El::input("number")
                .class("quantity__input")
                .attr("name", &format!("quantity-{}", item.sku))
                .attr("value", &line.quantity.to_string())
                .attr("data-action", "cart-qty")
                .attr("data-sku", item.sku),
            El::button("+")
                .class("qty-plus")
                .attr("data-action", "cart-plus")
                .attr("data-sku", item.sku),
            El::button("Remove")
                .class("remove-item")
                .attr("data-action", "cart-remove")
                .attr("data-sku", item.sku),
        ]))
    });
    let mut summary = El::div("cart__summary").children([
        El::div("cart__subtotal").text(&ksh(state.subtotal())),
        El::div("shipping-cost").text("Calculated at checkout"),
    ]);
    if state.discount.is_some() {
        summary = summary.child(El::div("cart__discount").text(&format!("{DISCOUNT_CODE} -10%")));
    }
    summary = summary.child(El::div("cart__total").id("cart-total").text(&ksh(state.total())));
    let main = El::div("cart").children([
        heading,
        El::new("form").class("cart__items").children(lines),
        summary,
        El::new("textarea").id("order_notes").attr("name", "note").attr("value", &state.order_notes),
        El::div("cart__coupon").children([
            El::input("text").id("coupon_code").attr("name", "discount"),
            El::button("Apply").id("apply-coupon").class("apply-coupon"),
            El::div("coupon-success").id("coupon-success").hidden().text("Discount code applied"),
            El::div("coupon-error").id("coupon-error").hidden().text("Enter a valid discount code"),
        ]),
        El::link("/checkout", "Check out").id("checkout").class("btn--checkout"),
        El::link("/shop", "Continue shopping").class("continue-shopping"),
    ]);
    layout("Your cart", state, main, footer(false))
        .on_click("cart-plus", |doc, node, state| {
            let sku = sku_of(doc, node);
            state.add_to_cart(&sku, 1);
            vec![Effect::Reload]
        })
        .on_click("cart-minus", |doc, node, state| {
            let sku = sku_of(doc, node);
            let current = state.cart.iter().find(|l| l.sku == sku).map_or(0, |l| l.quantity);
            state.set_quantity(&sku, current.saturating_sub(1));
            vec![Effect::Reload]
        })
        .on_click("cart-remove", |doc, node, state| {
            state.set_quantity(&sku_of(doc, node), 0);
            vec![Effect::Reload]
        })
        .on_enter("cart-qty", |doc, node, state| {
            let value = doc.attr_of(node, "value").unwrap_or_default();
            if let Ok(quantity) = value.trim().parse() {
                state.set_quantity(&sku_of(doc, node), quantity);
            }
            vec![Effect::Reload]
        })
        .on_click("apply-coupon", |doc, _, state| {
            let code = doc.value_of("coupon_code");
            if code.trim().eq_ignore_ascii_case(DISCOUNT_CODE) {
                state.discount = Some(DISCOUNT_CODE.to_string());
                vec![
                    Effect::Hide("coupon-error".into()),
                    Effect::Show("coupon-success".into()),
                    Effect::SetText("cart-total".into(), ksh(state.total())),
                ]
            } else {
                vec![Effect::Hide("coupon-success".into()), Effect::Show("coupon-error".into())]
            }
        })
        .on_click("checkout", |doc, _, state| {
            state.order_notes = doc.value_of("order_notes");
            vec![Effect::Navigate("/checkout".into())]
        })
}

fn checkout(state: &StoreState) -> FixtureDocument<StoreState> {
    let main = El::div("checkout").children([
        El::new("h1").class("page-title").text("Checkout"),
        El::new("p").text(&format!("Order total: {}", ksh(state.total()))),
    ]);
    layout("Checkout", state, main, footer(false))
}

const WISHLIST_SORTS: [(&str, &str); 4] = [
    ("added", "Date added"),
    ("price-asc", "Price: low to high"),
    ("price-desc", "Price: high to low"),
    ("name", "Name: A-Z"),
];

fn keyed_select(id: &str, name: &str, options: &[(&str, &str)], selected: &str) -> El {
    El::new("select")
        .id(id)
        .attr("name", name)
        .attr("value", selected)
        .children(
            options
                .iter()
                .map(|(key, label)| El::new("option").attr("value", key).text(label)),
        )
}

fn wishlist(request: &Request, state: &StoreState) -> FixtureDocument<StoreState> {
    let mut items: Vec<&Product> = state.wishlist.iter().filter_map(|sku| product(sku)).collect();
    let sort = request.param("sort").unwrap_or("added");
    match sort {
        "price-asc" => items.sort_by_key(|p| p.price),
        "price-desc" => items.sort_by_key(|p| std::cmp::Reverse(p.price)),
        "name" => items.sort_by_key(|p| p.name),
        _ => {}
    }
    let count = match items.len() {
        1 => "1 item".to_string(),
        n => format!("{n} items"),
    };
    let mut main = El::div("wishlist").children([
        El::new("h1").class("wishlist-title").text("My Wishlist"),
        El::new("span").class("wishlist-count").text(&count),
    ]);
    if items.is_empty() {
        main = main.children([
            El::div("empty-wishlist").text("Your wishlist is empty."),
            El::link("/shop", "Continue shopping").class("continue-shopping"),
        ]);
    } else {
        main = main
            .child(keyed_select("wishlist-sort", "sort_by", &WISHLIST_SORTS, sort))
            .children(items.iter().map(|item| {
                product_item(item, "wishlist-item").children([
                    El::button("Add to cart")
                        .class("add-to-cart")
                        .attr("data-action", "add-to-cart")
                        .attr("data-sku", item.sku),
                    El::button("Move to cart")
                        .class("move-to-cart")
                        .attr("data-action", "wishlist-move")
                        .attr("data-sku", item.sku),
                    El::button("Remove")
                        .class("remove-wishlist")
                        .attr("data-action", "wishlist-remove")
                        .attr("data-sku", item.sku),
                ])
            }))
            .children([
                El::button("Clear wishlist").id("clear-wishlist").class("clear-wishlist"),
                El::button("Share").id("share-wishlist").class("share-wishlist"),
                El::div("share-message").id("share-message").hidden().text("Link copied"),
                El::link("/shop", "Continue shopping").class("continue-shopping"),
            ]);
    }
    layout("Wishlist", state, main, footer(false))
        .on_click("add-to-cart", add_to_cart)
        .on_click("wishlist-move", |doc, node, state| {
            let sku = sku_of(doc, node);
            state.add_to_cart(&sku, 1);
            state.wishlist.retain(|s| *s != sku);
            vec![Effect::Reload]
        })
        .on_click("wishlist-remove", |doc, node, state| {
            let sku = sku_of(doc, node);
            state.wishlist.retain(|s| *s != sku);
            vec![Effect::Reload]
        })
        .on_click("clear-wishlist", |_, _, state| {
            state.wishlist.clear();
            vec![Effect::Reload]
        })
        .on_click("share-wishlist", |_, _, _| vec![Effect::Show("share-message".into())])
        .on_click("wishlist-sort", |doc, _, _| {
            let key = doc.value_of("wishlist-sort");
            vec![Effect::Navigate(format!("/account/wishlist?sort={}", percent_encode(&key)))]
        })
}

const SEARCH_SORTS: [(&str, &str); 4] = [
    ("relevance", "Relevance"),
    ("price-asc", "Price, low to high"),
    ("price-desc", "Price, high to low"),
    ("title-asc", "Alphabetically, A-Z"),
];

fn search(request: &Request, state: &StoreState) -> FixtureDocument<StoreState> {
    let term = request.param("q").unwrap_or_default().trim().to_string();
    let department = request.param("category").filter(|c| !c.is_empty());
    let sort = request.param("sort_by").unwrap_or("relevance");
    let base = format!("/search?q={}", percent_encode(&term));

    let mut results: Vec<&Product> = CATALOG
        .iter()
        .filter(|p| p.matches(&term))
        .filter(|p| department.map_or(true, |d| p.department.eq_ignore_ascii_case(d)))
        .collect();
    match sort {
        "price-asc" => results.sort_by_key(|p| p.price),
        "price-desc" => results.sort_by_key(|p| std::cmp::Reverse(p.price)),
        "title-asc" => results.sort_by_key(|p| p.name),
        _ => {}
    }

    let count = match results.len() {
        1 => "1 result".to_string(),
        n => format!("{n} results"),
    };
    let mut main = El::div("search").children([
        El::new("h1").class("page-title").text("Search results"),
        El::new("p")
            .text("Results for ")
            .child(El::new("span").class("search-query").text(&term)),
        El::new("p").class("results-count").text(&count),
        El::div("category-filter").children(
            DEPARTMENTS
                .iter()
                .map(|d| El::link(&format!("{base}&category={}", percent_encode(d)), d)),
        ),
        El::link(&base, "Clear all").class("clear-filters"),
        keyed_select("search-sort", "sort_by", &SEARCH_SORTS, sort).attr(
            "data-base",
            &match department {
                Some(d) => format!("{base}&category={}", percent_encode(d)),
                None => base.clone(),
            },
        ),
        El::button("Grid").class("view-grid"),
        El::button("List").class("view-list"),
    ]);
    if results.is_empty() {
        let message = if term.is_empty() {
            "Please enter a search term.".to_string()
        } else {
            format!("No results found for \"{term}\".")
        };
        main = main.child(El::div("no-results").text(&message));
    } else {
        main = main.child(El::div("product-grid").children(results.iter().map(|item| {
            product_item(item, "product-item").children([
                El::button("Add to cart")
                    .class("add-to-cart")
                    .attr("data-action", "add-to-cart")
                    .attr("data-sku", item.sku),
                El::button("Add to wishlist")
                    .class("add-to-wishlist")
                    .attr("data-action", "wishlist-add")
                    .attr("data-sku", item.sku),
            ])
        })));
    }
    layout("Search", state, main, footer(false))
        .on_click("add-to-cart", add_to_cart)
        .on_click("wishlist-add", add_to_wishlist)
        .on_click("search-sort", navigate_sorted)
}

/// Navigate to the select's `data-base` URL with its value as `sort_by`
fn navigate_sorted(doc: &FixtureDocument<StoreState>, node: NodeId, _: &mut StoreState) -> Vec<Effect> {
    let base = doc.attr_of(node, "data-base").unwrap_or_else(|| "/search".to_string());
    let key = doc.attr_of(node, "value").unwrap_or_default();
    let separator = if base.contains('?') { '&' } else { '?' };
    vec![Effect::Navigate(format!("{base}{separator}sort_by={}", percent_encode(&key)))]
}

const fn sort_key(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Default => "default",
        SortOrder::Rating => "rating",
        SortOrder::Latest => "latest",
        SortOrder::PriceLow => "price-asc",
        SortOrder::PriceHigh => "price-desc",
    }
}

/// Shop listing parameters, all carried in the query string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ShopQuery {
    category: Option<ShopCategory>,
    size: Option<u8>,
    sort: SortOrder,
    search: String,
    page: usize,
}

impl ShopQuery {
    fn from_request(request: &Request) -> Self {
        Self {
            category: request.param("category").and_then(|c| c.parse().ok()),
            size: request
                .param("size")
                .and_then(|s| s.parse::<ShoeSize>().ok())
                .map(ShoeSize::value),
            sort: request
                .param("sort_by")
                .and_then(|key| SortOrder::ALL.into_iter().find(|o| sort_key(*o) == key))
                .unwrap_or_default(),
            search: request.param("search").unwrap_or_default().trim().to_string(),
            page: request.param("page").and_then(|p| p.parse().ok()).unwrap_or(1),
        }
    }

    fn url(&self) -> String {
        let mut params = Vec::new();
        if let Some(category) = self.category {
            params.push(format!("category={}", category.label()));
        }
        if let Some(size) = self.size {
            params.push(format!("size={size}"));
        }
        if self.sort != SortOrder::Default {
            params.push(format!("sort_by={}", sort_key(self.sort)));
        }
        if !self.search.is_empty() {
            params.push(format!("search={}", percent_encode(&self.search)));
        }
        if self.page > 1 {
            params.push(format!("page={}", self.page));
        }
        if params.is_empty() {
            "/shop".to_string()
        } else {
            format!("/shop?{}", params.join("&"))
        }
    }

    fn matches(&self, item: &Product) -> bool {
        item.style.is_some()
            && self.category.map_or(true, |c| item.style == Some(c))
            && self.size.map_or(true, |s| item.sizes.contains(&s))
            && (self.search.is_empty() || item.matches(&self.search))
    }

    fn refined(&self, change: impl FnOnce(&mut Self)) -> Self {
        let mut next = self.clone();
        next.page = 1;
        change(&mut next);
        next
    }
}

fn shop(request: &Request, state: &StoreState) -> FixtureDocument<StoreState> {
    let query = ShopQuery::from_request(request);
    let mut listed: Vec<(usize, &Product)> = CATALOG
        .iter()
        .enumerate()
        .filter(|(_, p)| query.matches(p))
        .collect();
    match query.sort {
        SortOrder::Default => {}
        SortOrder::Rating => listed.sort_by_key(|(_, p)| std::cmp::Reverse(p.rating)),
        SortOrder::Latest => listed.sort_by_key(|(i, _)| std::cmp::Reverse(*i)),
        SortOrder::PriceLow => listed.sort_by_key(|(_, p)| p.price),
        SortOrder::PriceHigh => listed.sort_by_key(|(_, p)| std::cmp::Reverse(p.price)),
    }
    let total = listed.len();
    let pages = total.div_ceil(SHOP_PAGE_SIZE).max(1);
    let page = query.page.clamp(1, pages);

    let categories = El::div("category-filter").children(ShopCategory::ALL.into_iter().map(|c| {
        El::link(&query.refined(|q| q.category = Some(c)).url(), c.label())
    }));
    let sizes = El::div("size-filter").children(ShoeSize::all().map(|s| {
        El::link(&query.refined(|q| q.size = Some(s.value())).url(), &s.to_string())
    }));
    let sort_options: Vec<(&str, &str)> = SortOrder::ALL.iter().map(|o| (sort_key(*o), o.label())).collect();
    let sort = keyed_select("sort", "orderby", &sort_options, sort_key(query.sort))
        .attr("data-base", &query.refined(|q| q.sort = SortOrder::Default).url());
    let search = El::div("shop-search").children([
        El::input("search")
            .id("shop-search")
            .class("search-input")
            .attr("name", "search")
            .attr("value", &query.search),
        El::button("Search").id("shop-search-go").class("search-btn"),
    ]);

    let mut main = El::div("shop").children([
        breadcrumbs(&[], "Shop"),
        El::new("h1").class("page-title").text("Shop"),
        search,
        categories,
        sizes,
        sort,
        El::new("p")
            .class("products-count")
            .text(&format!("{total} Products found")),
    ]);
    if total == 0 {
        main = main.child(El::new("p").class("no-products").text("No products found"));
    } else {
        let cards = listed
            .iter()
            .skip((page - 1) * SHOP_PAGE_SIZE)
            .take(SHOP_PAGE_SIZE)
            .map(|(_, item)| shop_card(item));
        main = main.child(El::div("products-grid").children(cards));
    }
    if pages > 1 {
        let mut pager = El::div("page-numbers");
        if page > 1 {
            pager = pager.child(El::link(&query.refined(|q| q.page = page - 1).url(), "Previous").class("prev"));
        }
        for n in 1..=pages {
            pager = pager.child(if n == page {
                El::new("span").class("current").text(&n.to_string())
            } else {
                El::link(&query.refined(|q| q.page = n).url(), &n.to_string())
            });
        }
        if page < pages {
            pager = pager.child(El::link(&query.refined(|q| q.page = page + 1).url(), "Next").class("next"));
        }
        main = main.child(pager);
    }
    layout("Shop", state, main, footer(false))
        .on_click("add-to-cart", add_to_cart)
        .on_click("wishlist-add", add_to_wishlist)
        .on_click("sort", navigate_sorted)
        .on_click("shop-search-go", shop_search)
        .on_enter("shop-search", shop_search)
}

fn shop_card(item: &Product) -> El {
    let mut add = El::button("Add to Cart")
        .attr("data-action", "add-to-cart")
        .attr("data-sku", item.sku);
    if !item.in_stock {
        add = add.disabled();
    }
    El::div("product-card").attr("data-sku", item.sku).children([
        El::link(&item.path(), "")
            .class("product-link")
            .children([image_of(item), El::new("h3").class("product-name").text(item.name)]),
        El::new("span").class("price").text(&ksh(item.price)),
        add,
        El::button("Add to Wishlist")
            .class("wishlist-btn")
            .attr("data-action", "wishlist-add")
            .attr("data-sku", item.sku),
    ])
}

fn shop_search(doc: &FixtureDocument<StoreState>, _: NodeId, _: &mut StoreState) -> Vec<Effect> {
    let query = ShopQuery {
        search: doc.value_of("shop-search").trim().to_string(),
        ..ShopQuery::default()
    };
    vec![Effect::Navigate(query.url())]
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::{Settings, Timeouts, WindowSize};
    use crate::fixture::FixtureSession;
    use crate::page::{
        CartPage, FooterLink, HomePage, LoginPage, PageObject, ProductPage, RegistrationPage, SearchResultsPage, ShopPage,
        WishlistPage,
    };
    use crate::session::Session;

    fn settings() -> Settings {
        Settings::default()
            .with_base_url(format!("{STOREFRONT_ORIGIN}/"))
            .with_timeouts(Timeouts::uniform(60, 5))
    }

    fn open(state: StoreState, path: &str) -> FixtureSession<StoreState> {
        FixtureSession::open(storefront(), state, path)
    }

    #[test]
    fn test_price_formatting() {
        assert_eq!(ksh(950), "Ksh 950");
        assert_eq!(ksh(3_800), "Ksh 3,800");
        assert_eq!(ksh(1_234_567), "Ksh 1,234,567");
    }

    #[test]
    fn test_state_cart_arithmetic() {
        let mut state = StoreState::default().with_cart("VS-003", 2).with_cart("VS-010", 1);
        assert_eq!(state.cart_quantity(), 3);
        assert_eq!(state.subtotal(), 3_800 * 2 + 1_500);
        state.discount = Some(DISCOUNT_CODE.to_string());
        assert_eq!(state.total(), 9_100 - 910);
        state.set_quantity("VS-003", 0);
        assert_eq!(state.cart.len(), 1);
        state.add_to_cart("NOPE", 1);
        assert_eq!(state.cart.len(), 1);
    }

    #[test]
    fn test_every_catalog_product_has_a_page() {
        let s = open(StoreState::default(), "/");
        for item in &CATALOG {
            s.navigate(&item.path()).unwrap();
            assert!(s.title().unwrap().starts_with(item.name), "{}", item.slug);
        }
        s.navigate("/nowhere").unwrap();
        assert!(s.title().unwrap().contains("404"));
    }

    #[test]
    fn test_home_loads_and_searches() {
        let s = open(StoreState::default(), "/");
        let cfg = settings();
        let home = HomePage::new(&s, &cfg);
        assert!(home.is_loaded().unwrap());
        assert_eq!(home.cart_item_count().unwrap(), "0");
        assert_eq!(home.featured_products().unwrap().len(), 8);
        assert!(home.search_for_product("dress").unwrap());
        assert!(s.current_url().unwrap().ends_with("/search?q=dress"));
        let results = SearchResultsPage::new(&s, &cfg);
        assert!(results.is_loaded().unwrap());
        assert!(results.has_results().unwrap());
        assert_eq!(results.search_results().unwrap().len(), 2);
    }

    #[test]
    fn test_login_with_demo_account() {
        let s = open(StoreState::default(), "/account/login");
        let cfg = settings();
        let login = LoginPage::new(&s, &cfg);
        assert!(login.login(DEMO_EMAIL, DEMO_PASSWORD, false).unwrap());
        assert!(!s.current_url().unwrap().contains("login"));
        let signed_in = s.with_state(|st| st.signed_in.clone()).unwrap();
        assert_eq!(signed_in.as_deref(), Some(DEMO_EMAIL));
    }

    #[test]
    fn test_login_rejections_show_errors() {
        let s = open(StoreState::default(), "/account/login");
        let cfg = settings();
        let login = LoginPage::new(&s, &cfg);
        assert!(!login.login("", "", false).unwrap());
        assert_eq!(login.error_message().unwrap(), "Email required");
        assert!(!login.login(DEMO_EMAIL, "WrongPassword123!", false).unwrap());
        assert_eq!(login.error_message().unwrap(), "Incorrect email or password.");
    }

    #[test]
    fn test_registration_and_duplicate() {
        let s = open(StoreState::default(), "/account/register");
        let cfg = settings();
        let page = RegistrationPage::new(&s, &cfg);
        let user = UserRecord::valid_unique();
        assert!(page.register_user(&user).unwrap());
        assert!(s.current_url().unwrap().ends_with("/account"));

        s.navigate("/account/register").unwrap();
        assert!(!page.register_user(&user).unwrap());
        assert!(page.error_message().unwrap().contains("already associated"));

        assert!(!page.register_user(&UserRecord::weak_password()).unwrap());
        assert!(!page.field_errors().unwrap().is_empty());
    }

    #[test]
    fn test_product_to_cart_to_coupon() {
        let s = open(StoreState::default(), "/products/classic-stiletto-heels");
        let cfg = settings();
        let product = ProductPage::new(&s, &cfg);
        assert!(product.is_in_stock().unwrap());
        assert!(product.set_quantity(2).unwrap());
        assert!(product.add_to_cart().unwrap());
        assert_eq!(s.with_state(|st| st.cart_quantity()).unwrap(), 2);

        let cart = CartPage::new(&s, &cfg);
        cart.load().unwrap();
        assert!(!cart.is_cart_empty().unwrap());
        let items = cart.cart_items().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
        assert_eq!(cart.subtotal().unwrap(), "Ksh 7,600");
        assert!(!cart.apply_coupon("BOGUS").unwrap());
        assert!(cart.apply_coupon(DISCOUNT_CODE).unwrap());
        assert!(cart.remove_item(0).unwrap());
        assert!(cart.is_cart_empty().unwrap());
    }

    #[test]
    fn test_sold_out_product() {
        let s = open(StoreState::default(), "/products/patent-block-heels");
        let cfg = settings();
        let product = ProductPage::new(&s, &cfg);
        assert!(!product.is_in_stock().unwrap());
        assert!(!product.add_to_cart().unwrap());
        assert_eq!(s.with_state(|st| st.cart_quantity()).unwrap(), 0);
    }

    #[test]
    fn test_wishlist_move_all_to_cart() {
        let state = StoreState::default().with_wishlist("VS-001").with_wishlist("VS-009");
        let s = open(state, "/account/wishlist");
        let cfg = settings();
        let wishlist = WishlistPage::new(&s, &cfg);
        assert_eq!(wishlist.item_count().unwrap(), 2);
        assert!(wishlist.add_all_to_cart().unwrap());
        assert_eq!(s.with_state(|st| st.cart_quantity()).unwrap(), 2);
        assert!(wishlist.clear_wishlist().unwrap());
        assert!(wishlist.is_wishlist_empty().unwrap());
    }

    #[test]
    fn test_shop_filters_and_pagination() {
        let s = open(StoreState::default(), "/shop");
        let cfg = settings();
        let shop = ShopPage::new(&s, &cfg);
        assert!(shop.is_shop_page_loaded().unwrap());
        assert_eq!(shop.total_product_count().unwrap(), 7);
        assert_eq!(shop.visible_product_count().unwrap(), SHOP_PAGE_SIZE);
        assert!(shop.next_page().unwrap());
        assert_eq!(shop.current_page_number().unwrap(), 2);
        assert_eq!(shop.visible_product_count().unwrap(), 1);

        assert!(shop.filter_by_category(ShopCategory::Heels).unwrap());
        assert_eq!(shop.total_product_count().unwrap(), 2);
        assert!(shop.filter_by_size(ShoeSize::new(46).unwrap()).unwrap());
        assert!(shop.has_no_products().unwrap());
    }

    #[test]
    fn test_quantities_are_capped() {
        let mut state = StoreState::default().with_cart("VS-003", 150);
        assert_eq!(state.cart_quantity(), MAX_LINE_QUANTITY);
        state.set_quantity("VS-003", 999_999);
        state.add_to_cart("VS-003", 5);
        assert_eq!(state.cart_quantity(), MAX_LINE_QUANTITY);
        assert_eq!(state.subtotal(), 3_800 * MAX_LINE_QUANTITY);
    }

    #[test]
    fn test_odd_cart_quantities_keep_cart_consistent() {
        let s = open(StoreState::default().with_cart("VS-003", 2), "/cart");
        let cfg = settings();
        let cart = CartPage::new(&s, &cfg);
        assert!(cart.enter_item_quantity(0, "abc").unwrap());
        assert_eq!(cart.cart_items().unwrap()[0].quantity, 2);
        assert!(cart.enter_item_quantity(0, "-1").unwrap());
        assert_eq!(cart.cart_items().unwrap()[0].quantity, 2);
        assert!(cart.enter_item_quantity(0, "0").unwrap());
        assert!(cart.is_cart_empty().unwrap());
    }

    #[test]
    fn test_unknown_paths_keep_the_layout() {
        let s = open(StoreState::default(), "/collections/hats");
        let cfg = settings();
        let home = HomePage::new(&s, &cfg);
        assert!(home.base().is_error_page().unwrap());
        assert!(!home.is_loaded().unwrap());
        assert!(home.is_logo_visible().unwrap());
    }

    #[test]
    fn test_header_collapses_on_phones() {
        let s = open(StoreState::default(), "/");
        let cfg = settings();
        let home = HomePage::new(&s, &cfg);
        assert_eq!(home.navigation_links().unwrap().len(), DEPARTMENTS.len() + 1);
        home.base().set_window_size(WindowSize::MOBILE).unwrap();
        assert!(home.navigation_links().unwrap().is_empty());
        assert!(home.is_menu_button_visible().unwrap());
        assert!(home.open_mobile_menu().unwrap());
        home.base().set_window_size(WindowSize::new(MOBILE_MAX_WIDTH + 1, 1024)).unwrap();
        assert!(!home.is_menu_button_visible().unwrap());
    }

    #[test]
    fn test_footer_pages_and_breadcrumbs() {
        let s = open(StoreState::default(), "/");
        let cfg = settings();
        let home = HomePage::new(&s, &cfg);
        for link in FooterLink::ALL {
            home.load().unwrap();
            assert!(home.click_footer_link(link).unwrap(), "{link:?}");
            assert!(!home.base().is_error_page().unwrap(), "{link:?}");
        }
        s.navigate("/products/classic-stiletto-heels").unwrap();
        assert_eq!(
            home.base().breadcrumbs().unwrap(),
            ["Home", "Shop", "Shoes", "Classic Stiletto Heels"]
        );
        assert!(home.base().click_breadcrumb("Shop").unwrap());
        assert!(s.current_url().unwrap().ends_with("/shop"));
    }

    #[test]
    fn test_home_links_all_resolve() {
        let s = open(StoreState::default(), "/");
        let cfg = settings();
        let home = HomePage::new(&s, &cfg);
        let internal: Vec<_> = home
            .base()
            .links()
            .unwrap()
            .into_iter()
            .filter(|l| l.is_internal(cfg.base_url()))
            .collect();
        let report = home.base().verify_links(&internal, internal.len()).unwrap();
        assert!(report.is_clean(), "{report:#?}");
        assert_eq!(report.checked(), internal.len());
        assert!(home.is_loaded().unwrap());
    }

    #[test]
    fn test_shop_sort_by_price() {
        let s = open(StoreState::default(), "/shop");
        let cfg = settings();
        let shop = ShopPage::new(&s, &cfg);
        assert!(shop.sort_by(SortOrder::PriceLow).unwrap());
        assert!(s.current_url().unwrap().contains("sort_by=price-asc"));
        let prices = shop.product_prices().unwrap();
        assert_eq!(prices.first().map(String::as_str), Some("Ksh 2,400"));
    }
}
