//! Customer login page.

use super::{probe_outcome, BasePage, PageObject};
use crate::config::PageKind;
use crate::locator::{Locator, Selector};
use crate::outcome::Outcome;
use crate::result::VitrineResult;

const EMAIL_INPUT: Locator = Locator::new(
    "login email",
    &[
        Selector::css("#customer_email"),
        Selector::css("form input[name='email']"),
        Selector::css("input[type='email']"),
        Selector::id("email"),
    ],
);
const PASSWORD_INPUT: Locator = Locator::new(
    "login password",
    &[
        Selector::css("#customer_password"),
        Selector::css("input[name='password']"),
        Selector::css("input[type='password']"),
    ],
);
const LOGIN_BUTTON: Locator = Locator::new(
    "login button",
    &[
        Selector::css("#customer_login button[type='submit']"),
        Selector::css("form button[type='submit']"),
        Selector::css("input[type='submit']"),
    ],
);
const REMEMBER_ME: Locator = Locator::new(
    "remember me",
    &[Selector::css("#remember_me"), Selector::css("form input[type='checkbox']")],
);
const FORGOT_PASSWORD_LINK: Locator = Locator::new(
    "forgot password link",
    &[
        Selector::css("a[href*='recover']"),
        Selector::css("a[href*='forgot']"),
        Selector::xpath("//a[contains(text(), 'Forgot')]"),
    ],
);
const CREATE_ACCOUNT_LINK: Locator = Locator::new(
    "create account link",
    &[
        Selector::css("form a[href*='register']"),
        Selector::css("a[href*='signup']"),
        Selector::xpath("//a[contains(text(), 'Create')]"),
    ],
);
const ERROR_MESSAGE: Locator = Locator::new(
    "login error",
    &[
        Selector::css(".error"),
        Selector::css(".alert-error"),
        Selector::css(".form__message--error"),
        Selector::css(".errors"),
    ],
);
const SUCCESS_MESSAGE: Locator = Locator::new(
    "login success",
    &[
        Selector::css(".success"),
        Selector::css(".alert-success"),
        Selector::css(".form__message--success"),
    ],
);
const LOGIN_FORM: Locator = Locator::new(
    "login form",
    &[Selector::css("#customer_login"), Selector::css(".login-form"), Selector::css("form")],
);
const PAGE_HEADING: Locator = Locator::new(
    "login heading",
    &[Selector::css(".login-title"), Selector::css(".page-title"), Selector::css("h1")],
);

/// Customer login
#[derive(Debug, Clone, Copy)]
pub struct LoginPage<'s> {
    base: BasePage<'s>,
}

impl<'s> PageObject<'s> for LoginPage<'s> {
    const KIND: PageKind = PageKind::Login;

    fn from_base(base: BasePage<'s>) -> Self {
        Self { base }
    }

    fn base(&self) -> &BasePage<'s> {
        &self.base
    }

    fn is_loaded(&self) -> VitrineResult<bool> {
        let quick = self.base.within(self.base.settings().timeouts().confirm());
        Ok(quick.is_visible(&LOGIN_FORM)?
            && (quick.is_visible(&EMAIL_INPUT)? || self.base.url_contains("login")?))
    }
}

impl LoginPage<'_> {
    /// Submit credentials; `true` unless the site visibly refused them
    pub fn login(&self, email: &str, password: &str, remember_me: bool) -> VitrineResult<bool> {
        Ok(self.login_outcome(email, password, remember_me)?.is_accepted())
    }

    /// Submit credentials and classify what happened
    ///
    /// A required step that fails short-circuits to a silent rejection.
    pub fn login_outcome(&self, email: &str, password: &str, remember_me: bool) -> VitrineResult<Outcome> {
        if !self.base.type_text(&EMAIL_INPUT, email, true)? {
            tracing::error!("failed to enter email");
            return Ok(Outcome::RejectedSilently);
        }
        if !self.base.type_text(&PASSWORD_INPUT, password, true)? {
            tracing::error!("failed to enter password");
            return Ok(Outcome::RejectedSilently);
        }
        if remember_me && self.base.is_present(&REMEMBER_ME)? && !self.is_remember_me_checked()? {
            self.base.click(&REMEMBER_ME)?;
        }
        if !self.base.click(&LOGIN_BUTTON)? {
            tracing::error!("failed to click login button");
            return Ok(Outcome::RejectedSilently);
        }
        self.base.wait_for_page_load()?;
        let moved = !self.base.current_url()?.to_lowercase().contains("login");
        probe_outcome(&self.base, None, &ERROR_MESSAGE, moved)
    }

    /// Visible error text, empty when none shows up within the probe budget
    pub fn error_message(&self) -> VitrineResult<String> {
        self.base
            .within(self.base.settings().timeouts().probe())
            .visible_text(&ERROR_MESSAGE)
    }

    /// Visible success text, empty when none shows up within the probe budget
    pub fn success_message(&self) -> VitrineResult<String> {
        self.base
            .within(self.base.settings().timeouts().probe())
            .visible_text(&SUCCESS_MESSAGE)
    }

    /// Follow the forgot-password link
    pub fn click_forgot_password(&self) -> VitrineResult<bool> {
        self.click_and_settle(&FORGOT_PASSWORD_LINK)
    }

    /// Follow the create-account link
    pub fn click_create_account(&self) -> VitrineResult<bool> {
        self.click_and_settle(&CREATE_ACCOUNT_LINK)
    }

    fn click_and_settle(&self, link: &Locator) -> VitrineResult<bool> {
        if self.base.click(link)? {
            self.base.wait_for_page_load()?;
            return Ok(true);
        }
        Ok(false)
    }

    pub fn is_remember_me_checked(&self) -> VitrineResult<bool> {
        self.base.is_checked(&REMEMBER_ME)
    }

    /// Heading text of the page
    pub fn heading(&self) -> VitrineResult<String> {
        self.base.text(&PAGE_HEADING)
    }

    /// Empty both credential fields
    pub fn clear_form(&self) -> VitrineResult<()> {
        for field in [&EMAIL_INPUT, &PASSWORD_INPUT] {
            if !self.base.type_text(field, "", true)? {
                tracing::warn!(field = %field, "could not clear field");
            }
        }
        Ok(())
    }

    /// Email, password and submit are all in the document
    pub fn is_form_valid(&self) -> VitrineResult<bool> {
        Ok(self.base.is_present(&EMAIL_INPUT)?
            && self.base.is_present(&PASSWORD_INPUT)?
            && self.base.is_present(&LOGIN_BUTTON)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::{Settings, Timeouts};
    use crate::fixture::{Effect, El, FixtureDocument, FixtureSession, FixtureSite};
    use crate::outcome::{AcceptSignal, OutcomePolicy};
    use crate::session::Session;

    fn site() -> FixtureSite {
        FixtureSite::new("https://shop.test")
            .page("/account/login", |_, ()| {
                FixtureDocument::new("Login")
                    .with(
                        El::new("form")
                            .id("customer_login")
                            .child(El::input("email").id("customer_email"))
                            .child(El::input("password").id("customer_password"))
                            .child(El::input("checkbox").id("remember_me"))
                            .child(El::div("error").id("login-error").hidden())
                            .child(El::button("Sign in").attr("type", "submit").id("sign-in"))
                            .child(El::link("/account/recover", "Forgot your password?")),
                    )
                    .on_click("sign-in", |doc, _, ()| {
                        let email = doc.value_of("customer_email");
                        if email.is_empty() {
                            return vec![
                                Effect::SetText("login-error".into(), "Email required".into()),
                                Effect::Show("login-error".into()),
                            ];
                        }
                        if email == "valid@example.com" && doc.value_of("customer_password") == "Correct123!" {
                            vec![Effect::Navigate("/account".into())]
                        } else {
                            vec![]
                        }
                    })
            })
            .page("/account", |_, ()| FixtureDocument::new("Account").with(El::new("h1").text("My account")))
            .page("/account/recover", |_, ()| FixtureDocument::new("Recover"))
    }

    fn settings() -> Settings {
        Settings::default()
            .with_base_url("https://shop.test/")
            .with_timeouts(Timeouts::uniform(100, 10))
    }

    fn session() -> FixtureSession {
        FixtureSession::open(site(), (), "/account/login")
    }

    #[test]
    fn test_valid_login_leaves_login_page() {
        let s = session();
        let cfg = settings();
        let page = LoginPage::new(&s, &cfg);
        assert!(page.is_loaded().unwrap());
        assert!(page.login("valid@example.com", "Correct123!", false).unwrap());
        assert!(!s.current_url().unwrap().contains("login"));
    }

    #[test]
    fn test_silent_rejection_depends_on_policy() {
        let s = session();
        let cfg = settings();
        let page = LoginPage::new(&s, &cfg);
        assert_eq!(
            page.login_outcome("who@example.com", "nope", false).unwrap(),
            Outcome::Accepted(AcceptSignal::Assumed)
        );
        let strict = settings().with_outcome_policy(OutcomePolicy::Strict);
        let page = LoginPage::new(&s, &strict);
        assert_eq!(
            page.login_outcome("who@example.com", "nope", false).unwrap(),
            Outcome::RejectedSilently
        );
    }

    #[test]
    fn test_remember_me_and_form_helpers() {
        let s = session();
        let cfg = settings();
        let page = LoginPage::new(&s, &cfg);
        assert!(page.is_form_valid().unwrap());
        assert!(!page.is_remember_me_checked().unwrap());
        page.login("who@example.com", "nope", true).unwrap();
        assert!(page.is_remember_me_checked().unwrap());
        page.clear_form().unwrap();
        assert_eq!(page.base().attribute(&EMAIL_INPUT, "value").unwrap(), "");
    }

    #[test]
    fn test_forgot_password_link() {
        let s = session();
        let cfg = settings();
        let page = LoginPage::new(&s, &cfg);
        assert!(page.click_forgot_password().unwrap());
        assert!(s.current_url().unwrap().ends_with("/account/recover"));
    }
}
