//! Password recovery page.

use super::{probe_outcome, BasePage, PageObject};
use crate::config::PageKind;
use crate::locator::{Locator, Selector};
use crate::outcome::Outcome;
use crate::result::VitrineResult;

const EMAIL_INPUT: Locator = Locator::new(
    "recovery email",
    &[
        Selector::css("#recover_email"),
        Selector::css("form input[type='email']"),
        Selector::css("input[name='email']"),
    ],
);
const SUBMIT_BUTTON: Locator = Locator::new(
    "recovery submit",
    &[
        Selector::css("#recover_customer_password button[type='submit']"),
        Selector::css("form button[type='submit']"),
        Selector::css("input[type='submit']"),
    ],
);
const PAGE_HEADING: Locator = Locator::new(
    "recovery heading",
    &[Selector::css(".forgot-password-title"), Selector::css(".page-title"), Selector::css("h1")],
);
const INSTRUCTIONS: Locator = Locator::new(
    "recovery instructions",
    &[
        Selector::css(".instructions"),
        Selector::css(".forgot-password-text"),
        Selector::css(".form-description"),
    ],
);
const SUCCESS_MESSAGE: Locator = Locator::new(
    "recovery success",
    &[
        Selector::css(".success"),
        Selector::css(".alert-success"),
        Selector::css(".form__message--success"),
    ],
);
const ERROR_MESSAGE: Locator = Locator::new(
    "recovery error",
    &[Selector::css(".error"), Selector::css(".alert-error"), Selector::css(".form__message--error")],
);
const BACK_TO_LOGIN_LINK: Locator = Locator::new(
    "back to login",
    &[
        Selector::css("form a[href*='login']"),
        Selector::xpath("//a[contains(text(), 'Sign in')]"),
        Selector::xpath("//a[contains(text(), 'Login')]"),
    ],
);
const REGISTER_LINK: Locator = Locator::new(
    "register link",
    &[
        Selector::css("form a[href*='register']"),
        Selector::xpath("//a[contains(text(), 'Register')]"),
    ],
);

/// Password recovery
#[derive(Debug, Clone, Copy)]
pub struct ForgotPasswordPage<'s> {
    base: BasePage<'s>,
}

impl<'s> PageObject<'s> for ForgotPasswordPage<'s> {
    const KIND: PageKind = PageKind::ForgotPassword;

    fn from_base(base: BasePage<'s>) -> Self {
        Self { base }
    }

    fn base(&self) -> &BasePage<'s> {
        &self.base
    }

    fn is_loaded(&self) -> VitrineResult<bool> {
        let url = self.base.current_url()?.to_lowercase();
        if url.contains("forgot") || url.contains("recover") {
            return Ok(true);
        }
        self.base
            .within(self.base.settings().timeouts().confirm())
            .is_visible(&EMAIL_INPUT)
    }
}

impl ForgotPasswordPage<'_> {
    /// Request a reset link; `true` unless the site visibly refused
    pub fn reset_password(&self, email: &str) -> VitrineResult<bool> {
        Ok(self.reset_outcome(email)?.is_accepted())
    }

    /// Request a reset link and classify: success, then error, then policy
    pub fn reset_outcome(&self, email: &str) -> VitrineResult<Outcome> {
        if !self.base.type_text(&EMAIL_INPUT, email, true)? {
            tracing::error!("failed to enter email");
            return Ok(Outcome::RejectedSilently);
        }
        if !self.base.click(&SUBMIT_BUTTON)? {
            tracing::error!("failed to click submit");
            return Ok(Outcome::RejectedSilently);
        }
        self.base.wait_for_page_load()?;
        probe_outcome(&self.base, Some(&SUCCESS_MESSAGE), &ERROR_MESSAGE, false)
    }

    pub fn heading(&self) -> VitrineResult<String> {
        self.base.text(&PAGE_HEADING)
    }

    pub fn instructions(&self) -> VitrineResult<String> {
        self.base.text(&INSTRUCTIONS)
    }

    /// Visible success text, empty when none
    pub fn success_message(&self) -> VitrineResult<String> {
        self.base
            .within(self.base.settings().timeouts().probe())
            .visible_text(&SUCCESS_MESSAGE)
    }

    /// Visible error text, empty when none
    pub fn error_message(&self) -> VitrineResult<String> {
        self.base
            .within(self.base.settings().timeouts().probe())
            .visible_text(&ERROR_MESSAGE)
    }

    /// Return to the login page
    pub fn click_back_to_login(&self) -> VitrineResult<bool> {
        if self.base.click(&BACK_TO_LOGIN_LINK)? {
            self.base.wait_for_page_load()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Go to registration
    pub fn click_register_link(&self) -> VitrineResult<bool> {
        if self.base.click(&REGISTER_LINK)? {
            self.base.wait_for_page_load()?;
            return Ok(true);
        }
        Ok(false)
    }

    pub fn is_form_valid(&self) -> VitrineResult<bool> {
        Ok(self.base.is_present(&EMAIL_INPUT)? && self.base.is_present(&SUBMIT_BUTTON)?)
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
    use crate::test_data::looks_like_email;

    fn session() -> FixtureSession {
        let doc = FixtureDocument::new("Reset your password")
            .with(
                El::new("form")
                    .id("recover_customer_password")
                    .child(El::new("p").class("instructions").text("We will send you an email"))
                    .child(El::input("email").id("recover_email"))
                    .child(El::div("error").id("recover-error").hidden().text("Invalid email"))
                    .child(El::button("Submit").attr("type", "submit").id("recover"))
                    .child(El::link("/account/login", "Sign in")),
            )
            .on_click("recover", |doc, _, ()| {
                if looks_like_email(&doc.value_of("recover_email")) {
                    vec![]
                } else {
                    vec![Effect::Show("recover-error".into())]
                }
            });
        let site = FixtureSite::new("https://shop.test")
            .static_page("/account/recover", doc)
            .static_page("/account/login", FixtureDocument::new("Login"));
        FixtureSession::open(site, (), "/account/recover")
    }

    fn settings() -> Settings {
        Settings::default()
            .with_base_url("https://shop.test/")
            .with_timeouts(Timeouts::uniform(100, 10))
    }

    #[test]
    fn test_malformed_email_rejected_with_reason() {
        let s = session();
        let cfg = settings();
        let page = ForgotPasswordPage::new(&s, &cfg);
        assert!(page.is_loaded().unwrap());
        assert_eq!(
            page.reset_outcome("invalid-email").unwrap(),
            Outcome::RejectedWithReason("Invalid email".into())
        );
        assert_eq!(page.error_message().unwrap(), "Invalid email");
    }

    #[test]
    fn test_no_feedback_follows_policy() {
        let s = session();
        let cfg = settings();
        let page = ForgotPasswordPage::new(&s, &cfg);
        assert_eq!(
            page.reset_outcome("someone@example.com").unwrap(),
            Outcome::Accepted(AcceptSignal::Assumed)
        );
        let strict = settings().with_outcome_policy(OutcomePolicy::Strict);
        assert!(!ForgotPasswordPage::new(&s, &strict)
            .reset_password("someone@example.com")
            .unwrap());
    }

    #[test]
    fn test_back_to_login() {
        let s = session();
        let cfg = settings();
        let page = ForgotPasswordPage::new(&s, &cfg);
        assert_eq!(page.instructions().unwrap(), "We will send you an email");
        assert!(page.click_back_to_login().unwrap());
        assert_eq!(s.title().unwrap(), "Login");
    }
}
