//! Customer registration page.

use super::{probe_outcome, BasePage, PageObject};
use crate::config::PageKind;
use crate::locator::{Locator, Selector};
use crate::outcome::Outcome;
use crate::result::VitrineResult;
use crate::test_data::UserRecord;

const FIRST_NAME_INPUT: Locator = Locator::new(
    "first name",
    &[
        Selector::css("#customer_first_name"),
        Selector::css("input[name='first_name']"),
        Selector::css("input[name='firstName']"),
    ],
);
const LAST_NAME_INPUT: Locator = Locator::new(
    "last name",
    &[
        Selector::css("#customer_last_name"),
        Selector::css("input[name='last_name']"),
        Selector::css("input[name='lastName']"),
    ],
);
const EMAIL_INPUT: Locator = Locator::new(
    "registration email",
    &[
        Selector::css("#create_customer input[type='email']"),
        Selector::css("form input[name='email']"),
        Selector::id("customer_email"),
    ],
);
const PASSWORD_INPUT: Locator = Locator::new(
    "registration password",
    &[
        Selector::css("#create_customer input[name='password']"),
        Selector::css("input[name='password']"),
        Selector::id("customer_password"),
    ],
);
const CONFIRM_PASSWORD_INPUT: Locator = Locator::new(
    "confirm password",
    &[
        Selector::css("input[name='password_confirmation']"),
        Selector::css("input[name='confirm_password']"),
        Selector::id("confirm_password"),
    ],
);
const PHONE_INPUT: Locator = Locator::new(
    "phone",
    &[
        Selector::css("#customer_phone"),
        Selector::css("input[name='phone']"),
        Selector::css("input[type='tel']"),
    ],
);
const TERMS_CHECKBOX: Locator = Locator::new(
    "terms checkbox",
    &[Selector::css("input[name='terms']"), Selector::css("#agree_terms")],
);
const PRIVACY_CHECKBOX: Locator = Locator::new(
    "privacy checkbox",
    &[Selector::css("input[name='privacy']"), Selector::css("#agree_privacy")],
);
const NEWSLETTER_CHECKBOX: Locator = Locator::new(
    "newsletter checkbox",
    &[Selector::css("input[name='newsletter']"), Selector::css("#newsletter")],
);
const REGISTER_BUTTON: Locator = Locator::new(
    "register button",
    &[
        Selector::css("#create_customer button[type='submit']"),
        Selector::css("form button[type='submit']"),
        Selector::css("input[type='submit']"),
    ],
);
const LOGIN_LINK: Locator = Locator::new(
    "login link",
    &[
        Selector::css("form a[href*='login']"),
        Selector::xpath("//a[contains(text(), 'Sign in')]"),
        Selector::xpath("//a[contains(text(), 'Login')]"),
    ],
);
const ERROR_MESSAGE: Locator = Locator::new(
    "registration error",
    &[
        Selector::css(".error"),
        Selector::css(".alert-error"),
        Selector::css(".form__message--error"),
        Selector::css(".errors"),
    ],
);
const SUCCESS_MESSAGE: Locator = Locator::new(
    "registration success",
    &[
        Selector::css(".success"),
        Selector::css(".alert-success"),
        Selector::css(".form__message--success"),
    ],
);
const FIELD_ERRORS: Locator = Locator::new(
    "field errors",
    &[
        Selector::css(".field-error"),
        Selector::css(".input-error"),
        Selector::css(".error-message"),
    ],
);
const REGISTRATION_FORM: Locator = Locator::new(
    "registration form",
    &[Selector::css("#create_customer"), Selector::css(".register-form"), Selector::css("form")],
);

/// Customer registration
#[derive(Debug, Clone, Copy)]
pub struct RegistrationPage<'s> {
    base: BasePage<'s>,
}

impl<'s> PageObject<'s> for RegistrationPage<'s> {
    const KIND: PageKind = PageKind::Register;

    fn from_base(base: BasePage<'s>) -> Self {
        Self { base }
    }

    fn base(&self) -> &BasePage<'s> {
        &self.base
    }

    fn is_loaded(&self) -> VitrineResult<bool> {
        let quick = self.base.within(self.base.settings().timeouts().confirm());
        Ok(quick.is_visible(&REGISTRATION_FORM)?
            && (quick.is_visible(&EMAIL_INPUT)? || self.base.url_contains("register")?))
    }
}

impl RegistrationPage<'_> {
    /// Fill and submit the form; `true` unless the site visibly refused it
    pub fn register_user(&self, user: &UserRecord) -> VitrineResult<bool> {
        Ok(self.register_outcome(user, false)?.is_accepted())
    }

    /// Fill and submit the form, then classify what happened
    ///
    /// Optional fields are filled only when the form has them; terms and
    /// privacy boxes are ticked when present.
    pub fn register_outcome(&self, user: &UserRecord, subscribe_newsletter: bool) -> VitrineResult<Outcome> {
        let base = &self.base;
        let optional = [
            (&FIRST_NAME_INPUT, user.first_name.as_str()),
            (&LAST_NAME_INPUT, user.last_name.as_str()),
        ];
        for (field, value) in optional {
            if base.is_present(field)? && !base.type_text(field, value, true)? {
                tracing::error!(field = %field, "failed to fill field");
                return Ok(Outcome::RejectedSilently);
            }
        }
        for (field, value) in [(&EMAIL_INPUT, &user.email), (&PASSWORD_INPUT, &user.password)] {
            if !base.type_text(field, value, true)? {
                tracing::error!(field = %field, "failed to fill required field");
                return Ok(Outcome::RejectedSilently);
            }
        }
        let confirm_and_phone = [
            (&CONFIRM_PASSWORD_INPUT, user.password.as_str()),
            (&PHONE_INPUT, user.phone.as_str()),
        ];
        for (field, value) in confirm_and_phone {
            if base.is_present(field)? && !base.type_text(field, value, true)? {
                tracing::error!(field = %field, "failed to fill field");
                return Ok(Outcome::RejectedSilently);
            }
        }
        for agreement in [&TERMS_CHECKBOX, &PRIVACY_CHECKBOX] {
            if base.is_present(agreement)? && !base.is_checked(agreement)? && !base.click(agreement)? {
                tracing::error!(checkbox = %agreement, "failed to accept");
                return Ok(Outcome::RejectedSilently);
            }
        }
        if subscribe_newsletter && base.is_present(&NEWSLETTER_CHECKBOX)? && !base.is_checked(&NEWSLETTER_CHECKBOX)? {
            base.click(&NEWSLETTER_CHECKBOX)?;
        }
        if !base.click(&REGISTER_BUTTON)? {
            tracing::error!("failed to click register button");
            return Ok(Outcome::RejectedSilently);
        }
        base.wait_for_page_load()?;
        let moved = !base.current_url()?.to_lowercase().contains("register");
        probe_outcome(base, Some(&SUCCESS_MESSAGE), &ERROR_MESSAGE, moved)
    }

    /// Visible error text, empty when none
    pub fn error_message(&self) -> VitrineResult<String> {
        self.base
            .within(self.base.settings().timeouts().probe())
            .visible_text(&ERROR_MESSAGE)
    }

    /// Visible success text, empty when none
    pub fn success_message(&self) -> VitrineResult<String> {
        self.base
            .within(self.base.settings().timeouts().probe())
            .visible_text(&SUCCESS_MESSAGE)
    }

    /// Per-field validation messages currently shown
    pub fn field_errors(&self) -> VitrineResult<Vec<String>> {
        self.base
            .within(self.base.settings().timeouts().probe())
            .texts(&FIELD_ERRORS)
    }

    /// Terms accepted; a form without a terms box counts as accepted
    pub fn is_terms_checkbox_checked(&self) -> VitrineResult<bool> {
        if !self.base.is_present(&TERMS_CHECKBOX)? {
            return Ok(true);
        }
        self.base.is_checked(&TERMS_CHECKBOX)
    }

    pub fn is_newsletter_checkbox_checked(&self) -> VitrineResult<bool> {
        if !self.base.is_present(&NEWSLETTER_CHECKBOX)? {
            return Ok(false);
        }
        self.base.is_checked(&NEWSLETTER_CHECKBOX)
    }

    /// Follow the sign-in link
    pub fn click_login_link(&self) -> VitrineResult<bool> {
        if self.base.click(&LOGIN_LINK)? {
            self.base.wait_for_page_load()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Email, password and submit are all in the document
    pub fn is_form_valid(&self) -> VitrineResult<bool> {
        Ok(self.base.is_present(&EMAIL_INPUT)?
            && self.base.is_present(&PASSWORD_INPUT)?
            && self.base.is_present(&REGISTER_BUTTON)?)
    }
}
