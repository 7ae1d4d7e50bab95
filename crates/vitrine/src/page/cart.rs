//! Shopping cart page.

use serde::Serialize;

use super::{probe_outcome, recover, BasePage, PageObject};
use crate::config::PageKind;
use crate::locator::{Locator, Selector};
use crate::outcome::Outcome;
use crate::result::VitrineResult;
use crate::wait;

const CART_ITEMS: Locator = Locator::new(
    "cart items",
    &[Selector::css(".cart__item"), Selector::css(".cart-item"), Selector::css(".line-item")],
);
const ITEM_NAME: Locator = Locator::new(
    "item name",
    &[
        Selector::css(".cart__item-title"),
        Selector::css(".cart-item__title"),
        Selector::css(".line-item__title"),
    ],
);
const ITEM_PRICE: Locator = Locator::new(
    "item price",
    &[
        Selector::css(".cart__item-price"),
        Selector::css(".cart-item__price"),
        Selector::css(".line-item__price"),
    ],
);
const ITEM_IMAGE: Locator = Locator::new(
    "item image",
    &[Selector::css(".cart__item-image img"), Selector::css(".cart-item__image img")],
);
const QUANTITY_INPUTS: Locator = Locator::new(
    "quantity inputs",
    &[
        Selector::css("input[name*='quantity']"),
        Selector::css(".quantity__input"),
        Selector::css(".cart__quantity-input"),
    ],
);
const QUANTITY_INCREASE: Locator = Locator::new(
    "quantity increase",
    &[
        Selector::css(".quantity__button--increase"),
        Selector::css(".qty-plus"),
        Selector::css(".quantity-plus"),
    ],
);
const QUANTITY_DECREASE: Locator = Locator::new(
    "quantity decrease",
    &[
        Selector::css(".quantity__button--decrease"),
        Selector::css(".qty-minus"),
        Selector::css(".quantity-minus"),
    ],
);
const UPDATE_BUTTONS: Locator = Locator::new(
    "update quantity",
    &[Selector::css("button[name*='update']"), Selector::css(".cart__update")],
);
const REMOVE_BUTTONS: Locator = Locator::new(
    "remove item",
    &[
        Selector::css(".cart__remove"),
        Selector::css(".remove-item"),
        Selector::css("a[href*='remove']"),
        Selector::css("button[name*='remove']"),
    ],
);
const SUBTOTAL: Locator = Locator::new(
    "subtotal",
    &[Selector::css(".cart__subtotal"), Selector::css(".subtotal"), Selector::css(".cart-subtotal")],
);
const SHIPPING_COST: Locator = Locator::new(
    "shipping cost",
    &[Selector::css(".cart__shipping"), Selector::css(".shipping-cost")],
);
const TAX_AMOUNT: Locator =
    Locator::new("tax", &[Selector::css(".cart__tax"), Selector::css(".tax-amount")]);
const TOTAL_AMOUNT: Locator = Locator::new(
    "total",
    &[Selector::css(".cart__total"), Selector::css(".total-amount"), Selector::css(".grand-total")],
);
const CHECKOUT_BUTTON: Locator = Locator::new(
    "checkout",
    &[
        Selector::css(".btn--checkout"),
        Selector::css(".cart__checkout"),
        Selector::css("a[href*='checkout']"),
        Selector::css("button[name='checkout']"),
    ],
);
const CONTINUE_SHOPPING: Locator = Locator::new(
    "continue shopping",
    &[
        Selector::css(".continue-shopping"),
        Selector::css(".cart__continue"),
        Selector::css("a[href*='continue']"),
    ],
);
const EMPTY_CART_MESSAGE: Locator = Locator::new(
    "empty cart message",
    &[Selector::css(".cart--empty"), Selector::css(".empty-cart"), Selector::css(".cart__empty")],
);
const SHIPPING_CALCULATOR: Locator = Locator::new(
    "shipping calculator",
    &[Selector::css(".shipping-calculator"), Selector::css(".cart__shipping-calculator")],
);
const COUNTRY_SELECT: Locator = Locator::new(
    "country",
    &[Selector::css("#shipping_country"), Selector::css("select[name*='country']")],
);
const STATE_SELECT: Locator = Locator::new(
    "state",
    &[
        Selector::css("#shipping_state"),
        Selector::css("select[name*='state']"),
        Selector::css("select[name*='province']"),
    ],
);
const ZIP_INPUT: Locator = Locator::new(
    "zip",
    &[
        Selector::css("#shipping_zip"),
        Selector::css("input[name*='zip']"),
        Selector::css("input[name*='postal']"),
    ],
);
const CALCULATE_SHIPPING: Locator = Locator::new(
    "calculate shipping",
    &[Selector::css(".calculate-shipping"), Selector::css("button[name*='shipping']")],
);
const COUPON_INPUT: Locator = Locator::new(
    "coupon code",
    &[
        Selector::css("#coupon_code"),
        Selector::css("input[name*='coupon']"),
        Selector::css("input[name*='discount']"),
    ],
);
const APPLY_COUPON: Locator = Locator::new(
    "apply coupon",
    &[Selector::css(".apply-coupon"), Selector::css("button[name*='coupon']")],
);
const COUPON_ERROR: Locator = Locator::new(
    "coupon error",
    &[Selector::css(".coupon-error"), Selector::css(".discount-error")],
);
const COUPON_SUCCESS: Locator = Locator::new(
    "coupon success",
    &[Selector::css(".coupon-success"), Selector::css(".discount-success")],
);
const ORDER_NOTES: Locator = Locator::new(
    "order notes",
    &[
        Selector::css("#order_notes"),
        Selector::css("textarea[name*='note']"),
        Selector::css(".cart__notes"),
    ],
);

/// One cart line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItem {
    pub name: String,
    pub price: String,
    /// Quantity field value, 1 when the line has no readable field
    pub quantity: u32,
    pub image_src: String,
}

/// Shopping cart
#[derive(Debug, Clone, Copy)]
pub struct CartPage<'s> {
    base: BasePage<'s>,
}

impl<'s> PageObject<'s> for CartPage<'s> {
    const KIND: PageKind = PageKind::Cart;

    fn from_base(base: BasePage<'s>) -> Self {
        Self { base }
    }

    fn base(&self) -> &BasePage<'s> {
        &self.base
    }

    fn is_loaded(&self) -> VitrineResult<bool> {
        Ok(self.base.url_contains("cart")?
            || self.base.is_present(&CART_ITEMS)?
            || self.base.is_present(&EMPTY_CART_MESSAGE)?)
    }
}

impl CartPage<'_> {
    /// Empty message shown, or no line items at all
    pub fn is_cart_empty(&self) -> VitrineResult<bool> {
        let probe = self.base.within(self.base.settings().timeouts().probe());
        Ok(probe.is_visible(&EMPTY_CART_MESSAGE)? || self.base.count(&CART_ITEMS)? == 0)
    }

    pub fn empty_cart_message(&self) -> VitrineResult<String> {
        self.base
            .within(self.base.settings().timeouts().probe())
            .text(&EMPTY_CART_MESSAGE)
    }

    /// Every line with a readable name
    pub fn cart_items(&self) -> VitrineResult<Vec<CartItem>> {
        let lines = self
            .base
            .within(self.base.settings().timeouts().probe())
            .find_all(&CART_ITEMS)?;
        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            let name = self.base.text_within(line, &ITEM_NAME)?;
            if name.is_empty() {
                tracing::warn!(line = %line, "could not read cart line");
                continue;
            }
            let quantity = self.base.attribute_within(line, &QUANTITY_INPUTS, "value")?;
            items.push(CartItem {
                name,
                price: self.base.text_within(line, &ITEM_PRICE)?,
                quantity: quantity.trim().parse().unwrap_or(1),
                image_src: self.base.attribute_within(line, &ITEM_IMAGE, "src")?,
            });
        }
        Ok(items)
    }

    /// Number of cart lines currently rendered
    pub fn item_count(&self) -> VitrineResult<usize> {
        self.base.count(&CART_ITEMS)
    }

    /// Overwrite the quantity of line `index`, then submit via its update
    /// button or Enter
    pub fn update_item_quantity(&self, index: usize, quantity: u32) -> VitrineResult<bool> {
        self.enter_item_quantity(index, &quantity.to_string())
    }

    /// Type raw text into a line's quantity field and submit it
    ///
    /// The storefront decides what to make of non-numeric input.
    pub fn enter_item_quantity(&self, index: usize, raw: &str) -> VitrineResult<bool> {
        let Some(input) = self.base.find_indexed(&QUANTITY_INPUTS)?.into_iter().nth(index) else {
            tracing::warn!(index, "no quantity input at index");
            return Ok(false);
        };
        let session = self.base.session();
        let typed = session
            .clear(&input)
            .and_then(|()| session.send_keys(&input, raw));
        if !recover(typed.map(|()| true), false, "update quantity")? {
            return Ok(false);
        }
        let quick = self.base.within(self.base.settings().timeouts().probe());
        if wait::resolve_indexed(session, &UPDATE_BUTTONS)?.len() > index {
            if !quick.click_nth(&UPDATE_BUTTONS, index)? {
                return Ok(false);
            }
        } else {
            let submitted = session.send_keys(&input, "\n");
            if !recover(submitted.map(|()| true), false, "submit quantity")? {
                return Ok(false);
            }
        }
        self.base.wait_for_page_load()?;
        Ok(true)
    }

    pub fn increase_item_quantity(&self, index: usize) -> VitrineResult<bool> {
        self.click_line_control(&QUANTITY_INCREASE, index)
    }

    pub fn decrease_item_quantity(&self, index: usize) -> VitrineResult<bool> {
        self.click_line_control(&QUANTITY_DECREASE, index)
    }

    /// Remove line `index`
    pub fn remove_item(&self, index: usize) -> VitrineResult<bool> {
        self.click_line_control(&REMOVE_BUTTONS, index)
    }

    fn click_line_control(&self, control: &Locator, index: usize) -> VitrineResult<bool> {
        if self.base.click_nth(control, index)? {
            self.base.wait_for_page_load()?;
            return Ok(true);
        }
        Ok(false)
    }

    pub fn subtotal(&self) -> VitrineResult<String> {
        self.base.text(&SUBTOTAL)
    }

    pub fn shipping(&self) -> VitrineResult<String> {
        self.base.text(&SHIPPING_COST)
    }

    pub fn tax(&self) -> VitrineResult<String> {
        self.base.text(&TAX_AMOUNT)
    }

    pub fn total(&self) -> VitrineResult<String> {
        self.base.text(&TOTAL_AMOUNT)
    }

    pub fn proceed_to_checkout(&self) -> VitrineResult<bool> {
        self.click_and_settle(&CHECKOUT_BUTTON)
    }

    pub fn continue_shopping(&self) -> VitrineResult<bool> {
        self.click_and_settle(&CONTINUE_SHOPPING)
    }

    fn click_and_settle(&self, locator: &Locator) -> VitrineResult<bool> {
        if self.base.click(locator)? {
            self.base.wait_for_page_load()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Apply a discount code; `true` unless the site visibly refused it
    pub fn apply_coupon(&self, code: &str) -> VitrineResult<bool> {
        Ok(self.apply_coupon_outcome(code)?.is_accepted())
    }

    /// Apply a discount code and classify the response
    pub fn apply_coupon_outcome(&self, code: &str) -> VitrineResult<Outcome> {
        if !self.base.type_text(&COUPON_INPUT, code, true)? {
            tracing::error!("coupon field unavailable");
            return Ok(Outcome::RejectedSilently);
        }
        if !self.base.click(&APPLY_COUPON)? {
            tracing::error!("failed to click apply coupon");
            return Ok(Outcome::RejectedSilently);
        }
        self.base.wait_for_page_load()?;
        probe_outcome(&self.base, Some(&COUPON_SUCCESS), &COUPON_ERROR, false)
    }

    pub fn coupon_error_message(&self) -> VitrineResult<String> {
        self.base
            .within(self.base.settings().timeouts().probe())
            .visible_text(&COUPON_ERROR)
    }

    /// Fill whichever destination fields are given and request a quote
    ///
    /// `false` when the cart has no shipping calculator.
    pub fn calculate_shipping(
        &self,
        country: Option<&str>,
        state: Option<&str>,
        zip: Option<&str>,
    ) -> VitrineResult<bool> {
        if !self.base.is_present(&SHIPPING_CALCULATOR)? {
            tracing::info!("no shipping calculator");
            return Ok(false);
        }
        for (select, value) in [(&COUNTRY_SELECT, country), (&STATE_SELECT, state)] {
            if let Some(value) = value {
                if self.base.is_present(select)? && !self.base.select_by_text(select, value)? {
                    tracing::warn!(field = %select, value, "option not selectable");
                }
            }
        }
        if let Some(zip) = zip {
            if self.base.is_present(&ZIP_INPUT)? {
                self.base.type_text(&ZIP_INPUT, zip, true)?;
            }
        }
        self.click_and_settle(&CALCULATE_SHIPPING)
    }

    pub fn add_order_notes(&self, notes: &str) -> VitrineResult<bool> {
        self.base.type_text(&ORDER_NOTES, notes, true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::{Settings, Timeouts};
    use crate::fixture::{Effect, El, FixtureDocument, FixtureSession, FixtureSite};

    fn settings() -> Settings {
        Settings::default()
            .with_base_url("https://shop.test/")
            .with_timeouts(Timeouts::uniform(100, 10))
    }

    fn line(n: usize, name: &str, qty: &str) -> El {
        El::div("cart-item")
            .id(&format!("line-{n}"))
            .child(El::div("cart-item__title").text(name))
            .child(El::div("cart-item__price").text("Ksh 2,500"))
            .child(El::div("cart-item__image").child(El::new("img").attr("src", &format!("/p/{n}.jpg"))))
            .child(
                El::input("number")
                    .attr("name", "updates[quantity]")
                    .attr("value", qty)
                    .id(&format!("qty-{n}")),
            )
            .child(El::button("Remove").class("remove-item").id(&format!("remove-{n}")))
    }

    fn filled() -> FixtureSession {
        let doc = FixtureDocument::new("Your cart")
            .with(line(0, "Block Heels", "1"))
            .with(line(1, "Ankle Boots", "2"))
            .with(El::div("cart__subtotal").text("Ksh 7,500"))
            .with(
                El::div("coupon")
                    .child(El::input("text").id("coupon_code"))
                    .child(El::button("Apply").class("apply-coupon").id("apply"))
                    .child(El::div("coupon-error").id("coupon-error").hidden().text("Code not valid")),
            )
            .on_click("remove-0", |_, _, ()| vec![Effect::Remove("line-0".into())])
            .on_click("apply", |doc, _, ()| {
                if doc.value_of("coupon_code") == "BOGUS" {
                    vec![Effect::Show("coupon-error".into())]
                } else {
                    vec![]
                }
            });
        FixtureSession::open(FixtureSite::new("https://shop.test").static_page("/cart", doc), (), "/cart")
    }

    #[test]
    fn test_empty_cart_detected() {
        let doc = FixtureDocument::new("Your cart")
            .with(El::div("empty-cart").text("Your cart is currently empty."));
        let s = FixtureSession::open(FixtureSite::new("https://shop.test").static_page("/cart", doc), (), "/cart");
        let cfg = settings();
        let page = CartPage::new(&s, &cfg);
        assert!(page.is_loaded().unwrap());
        assert!(page.is_cart_empty().unwrap());
        assert_eq!(page.empty_cart_message().unwrap(), "Your cart is currently empty.");
        assert!(page.cart_items().unwrap().is_empty());
    }

    #[test]
    fn test_items_extracted_per_line() {
        let s = filled();
        let cfg = settings();
        let page = CartPage::new(&s, &cfg);
        assert!(!page.is_cart_empty().unwrap());
        let items = page.cart_items().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[1],
            CartItem {
                name: "Ankle Boots".into(),
                price: "Ksh 2,500".into(),
                quantity: 2,
                image_src: "/p/1.jpg".into(),
            }
        );
        assert_eq!(page.subtotal().unwrap(), "Ksh 7,500");
        assert_eq!(page.total().unwrap(), "");
    }

    #[test]
    fn test_remove_and_update_by_index() {
        let s = filled();
        let cfg = settings();
        let page = CartPage::new(&s, &cfg);
        assert!(page.update_item_quantity(1, 3).unwrap());
        assert_eq!(page.cart_items().unwrap()[1].quantity, 3);
        assert!(page.remove_item(0).unwrap());
        assert_eq!(page.item_count().unwrap(), 1);
        assert!(!page.remove_item(5).unwrap());
        assert!(!page.increase_item_quantity(0).unwrap());
    }

    #[test]
    fn test_coupon_outcomes() {
        let s = filled();
        let cfg = settings();
        let page = CartPage::new(&s, &cfg);
        assert_eq!(
            page.apply_coupon_outcome("BOGUS").unwrap(),
            Outcome::RejectedWithReason("Code not valid".into())
        );
        assert_eq!(page.coupon_error_message().unwrap(), "Code not valid");
    }

    #[test]
    fn test_optional_affordances_absent() {
        let s = filled();
        let cfg = settings();
        let page = CartPage::new(&s, &cfg);
        assert!(!page.calculate_shipping(Some("Kenya"), None, Some("00100")).unwrap());
        assert!(!page.add_order_notes("leave at door").unwrap());
        assert!(!page.proceed_to_checkout().unwrap());
    }
}
