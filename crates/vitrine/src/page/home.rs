//! Storefront home page.

use serde::Serialize;

use super::{BasePage, PageObject};
use crate::config::PageKind;
use crate::locator::{Locator, Selector};
use crate::result::VitrineResult;

const LOGO: Locator = Locator::new(
    "logo",
    &[
        Selector::css(".header__logo img"),
        Selector::css(".logo img"),
        Selector::css("img[alt*='logo']"),
    ],
);
const SEARCH_BOX: Locator = Locator::new(
    "search box",
    &[
        Selector::css("input[name='q']"),
        Selector::css(".search__input"),
        Selector::css("#search-input"),
    ],
);
const SEARCH_BUTTON: Locator = Locator::new(
    "search button",
    &[Selector::css(".search__submit"), Selector::css(".search-btn")],
);
const NAV_LINKS: Locator = Locator::new(
    "navigation links",
    &[
        Selector::css(".main-nav a"),
        Selector::css(".header__nav a"),
        Selector::css("nav a"),
    ],
);
const LOGIN_LINK: Locator = Locator::new(
    "login link",
    &[
        Selector::css("header a[href*='login']"),
        Selector::xpath("//a[contains(text(), 'Login')]"),
        Selector::xpath("//a[contains(text(), 'Sign In')]"),
    ],
);
const REGISTER_LINK: Locator = Locator::new(
    "register link",
    &[
        Selector::css("header a[href*='register']"),
        Selector::xpath("//a[contains(text(), 'Register')]"),
    ],
);
const CART_LINK: Locator = Locator::new(
    "cart link",
    &[
        Selector::css(".header__cart"),
        Selector::css(".cart-link"),
        Selector::css("header a[href*='cart']"),
    ],
);
const WISHLIST_LINK: Locator = Locator::new(
    "wishlist link",
    &[Selector::css(".wishlist-link"), Selector::css("header a[href*='wishlist']")],
);
const CART_COUNT: Locator = Locator::new(
    "cart count",
    &[
        Selector::css(".cart-count"),
        Selector::css(".cart__count"),
        Selector::css(".header__cart-count"),
    ],
);
const HERO_SECTION: Locator = Locator::new(
    "hero section",
    &[
        Selector::css(".hero"),
        Selector::css(".slideshow"),
        Selector::css(".main-banner"),
    ],
);
const HERO_TITLE: Locator = Locator::new(
    "hero title",
    &[Selector::css(".hero__title"), Selector::css(".banner__title"), Selector::css(".slideshow__title")],
);
const HERO_CTA: Locator = Locator::new(
    "hero call to action",
    &[Selector::css(".hero__cta"), Selector::css(".banner__cta")],
);
const PRODUCT_CARDS: Locator = Locator::new(
    "product cards",
    &[Selector::css(".product-card"), Selector::css(".product-item")],
);
const CARD_TITLE: Locator = Locator::new(
    "card title",
    &[Selector::css(".product-card__title"), Selector::css(".product-title")],
);
const CARD_PRICE: Locator = Locator::new(
    "card price",
    &[Selector::css(".product-card__price"), Selector::css(".price")],
);
const CARD_IMAGE: Locator = Locator::new(
    "card image",
    &[Selector::css(".product-card__image img"), Selector::css("img")],
);
const FOOTER: Locator = Locator::new("footer", &[Selector::css("footer"), Selector::css(".footer")]);
const NEWSLETTER_INPUT: Locator = Locator::new(
    "newsletter email",
    &[Selector::css(".newsletter__input"), Selector::css("footer input[type='email']")],
);
const NEWSLETTER_SUBMIT: Locator = Locator::new(
    "newsletter submit",
    &[Selector::css(".newsletter__submit"), Selector::xpath("//button[text()='Subscribe']")],
);
const SOCIAL_LINKS: Locator = Locator::new(
    "social links",
    &[
        Selector::css(".social-links a"),
        Selector::css("a[href*='facebook']"),
        Selector::css("a[href*='instagram']"),
        Selector::css("a[href*='twitter']"),
    ],
);

const MENU_BUTTON: Locator = Locator::new(
    "menu button",
    &[
        Selector::css(".menu-toggle"),
        Selector::css(".mobile-menu-toggle"),
        Selector::css("button[aria-label*='menu']"),
    ],
);
const MOBILE_MENU: Locator = Locator::new(
    "mobile menu",
    &[Selector::css(".mobile-nav"), Selector::css(".mobile-menu"), Selector::css("#mobile-nav")],
);
static ABOUT_LINK: Locator = Locator::new(
    "about link",
    &[
        Selector::css("footer a[href*='about']"),
        Selector::xpath("//footer//a[contains(text(), 'About')]"),
    ],
);
static CONTACT_LINK: Locator = Locator::new(
    "contact link",
    &[
        Selector::css("footer a[href*='contact']"),
        Selector::xpath("//footer//a[contains(text(), 'Contact')]"),
    ],
);
static PRIVACY_LINK: Locator = Locator::new(
    "privacy link",
    &[
        Selector::css("footer a[href*='privacy']"),
        Selector::xpath("//footer//a[contains(text(), 'Privacy')]"),
    ],
);
static TERMS_LINK: Locator = Locator::new(
    "terms link",
    &[
        Selector::css("footer a[href*='terms']"),
        Selector::xpath("//footer//a[contains(text(), 'Terms')]"),
    ],
);

/// Most featured products read from the home page
pub const MAX_FEATURED: usize = 10;

/// One product card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductCard {
    /// Product title
    pub title: String,
    /// Price as displayed
    pub price: String,
    /// Image source
    pub image_src: String,
}

/// Informational pages linked from the footer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FooterLink {
    About,
    Contact,
    Privacy,
    Terms,
}

impl FooterLink {
    pub const ALL: [Self; 4] = [Self::About, Self::Contact, Self::Privacy, Self::Terms];

    /// Link text as shown
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::About => "About Us",
            Self::Contact => "Contact",
            Self::Privacy => "Privacy Policy",
            Self::Terms => "Terms of Service",
        }
    }

    fn locator(self) -> &'static Locator {
        match self {
            Self::About => &ABOUT_LINK,
            Self::Contact => &CONTACT_LINK,
            Self::Privacy => &PRIVACY_LINK,
            Self::Terms => &TERMS_LINK,
        }
    }
}

/// Storefront home
#[derive(Debug, Clone, Copy)]
pub struct HomePage<'s> {
    base: BasePage<'s>,
}

impl<'s> PageObject<'s> for HomePage<'s> {
    const KIND: PageKind = PageKind::Home;

    fn from_base(base: BasePage<'s>) -> Self {
        Self { base }
    }

    fn base(&self) -> &BasePage<'s> {
        &self.base
    }

    /// Logo shown and the document is not an error page
    fn is_loaded(&self) -> VitrineResult<bool> {
        let logo = self
            .base
            .within(self.base.settings().timeouts().confirm())
            .is_visible(&LOGO)?;
        let title = self.base.title()?.to_lowercase();
        Ok(logo && !title.contains("not found") && !title.contains("404"))
    }
}

impl HomePage<'_> {
    /// Type a term and submit with the search button, or Enter when it is missing
    pub fn search_for_product(&self, term: &str) -> VitrineResult<bool> {
        if !self.base.type_text(&SEARCH_BOX, term, true)? {
            tracing::error!(term, "could not type search term");
            return Ok(false);
        }
        let probe = self.base.within(self.base.settings().timeouts().probe());
        if !probe.click(&SEARCH_BUTTON)? && !self.base.press_enter(&SEARCH_BOX)? {
            return Ok(false);
        }
        self.base.wait_for_page_load()?;
        Ok(true)
    }

    /// Up to [`MAX_FEATURED`] product cards
    pub fn featured_products(&self) -> VitrineResult<Vec<ProductCard>> {
        let mut products = Vec::new();
        for card in self.base.find_all(&PRODUCT_CARDS)?.iter().take(MAX_FEATURED) {
            let title = self.base.text_within(card, &CARD_TITLE)?;
            if title.is_empty() {
                tracing::warn!(card = %card, "product card without title");
                continue;
            }
            products.push(ProductCard {
                title,
                price: self.base.text_within(card, &CARD_PRICE)?,
                image_src: self.base.attribute_within(card, &CARD_IMAGE, "src")?,
            });
        }
        Ok(products)
    }

    /// Open a menu category (dresses, shoes, bags, jewelry, accessories)
    pub fn click_product_category(&self, category: &str) -> VitrineResult<bool> {
        let key = category.trim().to_lowercase();
        let stem = match key.as_str() {
            "dresses" => "dress",
            "shoes" => "shoe",
            "bags" => "bag",
            "jewelry" => "jewelry",
            "accessories" => "accessories",
            _ => {
                tracing::error!(category, "unknown category");
                return Ok(false);
            }
        };
        let title = capitalize(&key);
        let locator = Locator::dynamic(
            format!("{key} menu entry"),
            &[
                Selector::css(&format!("nav a[href*='{stem}']")),
                Selector::xpath(&format!("//nav//a[contains(text(), '{title}')]")),
            ],
        );
        self.click_and_settle(&locator)
    }

    pub fn click_login_link(&self) -> VitrineResult<bool> {
        self.click_and_settle(&LOGIN_LINK)
    }

    pub fn click_register_link(&self) -> VitrineResult<bool> {
        self.click_and_settle(&REGISTER_LINK)
    }

    pub fn click_cart_link(&self) -> VitrineResult<bool> {
        self.click_and_settle(&CART_LINK)
    }

    pub fn click_wishlist_link(&self) -> VitrineResult<bool> {
        self.click_and_settle(&WISHLIST_LINK)
    }

    fn click_and_settle(&self, locator: &Locator) -> VitrineResult<bool> {
        if self.base.click(locator)? {
            self.base.wait_for_page_load()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Header cart badge, `"0"` when missing or blank
    pub fn cart_item_count(&self) -> VitrineResult<String> {
        let count = self
            .base
            .within(self.base.settings().timeouts().probe())
            .text(&CART_COUNT)?;
        Ok(if count.is_empty() { "0".to_string() } else { count })
    }

    pub fn is_hero_section_visible(&self) -> VitrineResult<bool> {
        self.base.is_visible(&HERO_SECTION)
    }

    pub fn hero_title(&self) -> VitrineResult<String> {
        self.base.text(&HERO_TITLE)
    }

    pub fn click_hero_cta(&self) -> VitrineResult<bool> {
        self.base.click(&HERO_CTA)
    }

    /// Non-empty texts of the main navigation links
    pub fn navigation_links(&self) -> VitrineResult<Vec<String>> {
        self.base.texts(&NAV_LINKS)
    }

    /// Fill the footer newsletter form and submit it
    pub fn subscribe_to_newsletter(&self, email: &str) -> VitrineResult<bool> {
        if !self.base.type_text(&NEWSLETTER_INPUT, email, true)? {
            return Ok(false);
        }
        self.base.click(&NEWSLETTER_SUBMIT)
    }

    /// `href`s of the social media links
    pub fn social_media_links(&self) -> VitrineResult<Vec<String>> {
        self.base.attributes(&SOCIAL_LINKS, "href")
    }

    /// Desktop navigation or, on narrow viewports, the menu button
    pub fn is_navigation_visible(&self) -> VitrineResult<bool> {
        let quick = self.base.within(self.base.settings().timeouts().probe());
        if quick.is_visible(&NAV_LINKS)? {
            return Ok(true);
        }
        self.base.is_visible(&MENU_BUTTON)
    }

    pub fn is_menu_button_visible(&self) -> VitrineResult<bool> {
        self.base.is_visible(&MENU_BUTTON)
    }

    /// Tap the menu button; true when the mobile menu opened
    pub fn open_mobile_menu(&self) -> VitrineResult<bool> {
        if !self.base.click(&MENU_BUTTON)? {
            return Ok(false);
        }
        self.base.is_visible(&MOBILE_MENU)
    }

    pub fn is_footer_link_visible(&self, link: FooterLink) -> VitrineResult<bool> {
        self.base.scroll_into_view(&FOOTER)?;
        self.base.is_visible(link.locator())
    }

    pub fn click_footer_link(&self, link: FooterLink) -> VitrineResult<bool> {
        self.base.scroll_into_view(&FOOTER)?;
        self.click_and_settle(link.locator())
    }

    pub fn is_logo_visible(&self) -> VitrineResult<bool> {
        self.base.is_visible(&LOGO)
    }

    pub fn is_footer_visible(&self) -> VitrineResult<bool> {
        self.base.scroll_into_view(&FOOTER)?;
        self.base.is_visible(&FOOTER)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars
        .next()
        .map(|c| c.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}
