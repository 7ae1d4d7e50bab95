use crate::harness::{assume, verify, Marker, Scenario, ScenarioContext};
use crate::page::{LoginPage, PageObject, RegistrationPage};
use crate::result::VitrineResult;
use crate::test_data::UserRecord;

const REGISTRATION: &[Marker] = &[Marker::Registration];

pub(super) const SCENARIOS: &[Scenario] = &[
    Scenario::new("registration", "test_registration_page_loads", &[Marker::Registration, Marker::Smoke], page_loads),
    Scenario::new("registration", "test_registration_form_elements", REGISTRATION, form_elements),
    Scenario::new("registration", "test_valid_user_registration", REGISTRATION, valid_registration),
    Scenario::new("registration", "test_duplicate_email_registration", REGISTRATION, duplicate_email),
    Scenario::new("registration", "test_invalid_email_registration", REGISTRATION, invalid_email),
    Scenario::new("registration", "test_weak_password_registration", REGISTRATION, weak_password),
    Scenario::new("registration", "test_empty_required_fields", REGISTRATION, empty_required_fields),
    Scenario::new("registration", "test_terms_and_conditions_requirement", REGISTRATION, terms_requirement),
    Scenario::new("registration", "test_newsletter_subscription_option", REGISTRATION, newsletter_option),
    Scenario::new("registration", "test_login_link_from_registration", &[Marker::Registration, Marker::Login], login_link),
    Scenario::new(
        "registration",
        "test_registration_form_validation_messages",
        &[Marker::Registration, Marker::Regression],
        validation_messages,
    ),
];

/// The registration page, or a skip when the site does not offer one
fn open<'s>(ctx: &ScenarioContext<'s>) -> VitrineResult<RegistrationPage<'s>> {
    let page = ctx.open::<RegistrationPage>()?;
    assume(page.is_loaded()?, "registration page not accessible")?;
    Ok(page)
}

fn page_loads(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let page = ctx.open::<RegistrationPage>()?;
    verify(page.is_loaded()?, "registration page did not load")
}

fn form_elements(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let page = open(ctx)?;
    verify(page.is_form_valid()?, "registration form is incomplete")
}

fn valid_registration(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let page = open(ctx)?;
    let outcome = page.register_outcome(&UserRecord::valid_unique(), false)?;
    tracing::info!(%outcome, "fresh account");
    verify(outcome.is_accepted(), format!("fresh account refused: {outcome}"))
}

fn duplicate_email(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let page = open(ctx)?;
    let existing = ctx.settings().test_user().clone();
    let outcome = page.register_outcome(&existing, false)?;
    verify(!outcome.is_confirmed(), format!("duplicate account created: {outcome}"))
}

fn invalid_email(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let page = open(ctx)?;
    let outcome = page.register_outcome(&UserRecord::invalid_email(), false)?;
    verify(!outcome.is_confirmed(), format!("malformed email accepted: {outcome}"))
}

fn weak_password(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let page = open(ctx)?;
    let outcome = page.register_outcome(&UserRecord::weak_password(), false)?;
    verify(!outcome.is_confirmed(), format!("weak password accepted: {outcome}"))?;
    let feedback = !page.field_errors()?.is_empty() || !page.error_message()?.is_empty();
    verify(feedback || !outcome.is_accepted(), "weak password refused without feedback")
}

fn empty_required_fields(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let page = open(ctx)?;
    let blank = UserRecord::valid_unique().with_email("").with_password("");
    let outcome = page.register_outcome(&blank, false)?;
    verify(!outcome.is_confirmed(), format!("blank form accepted: {outcome}"))
}

fn terms_requirement(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let page = open(ctx)?;
    let outcome = page.register_outcome(&UserRecord::valid_unique(), false)?;
    assume(outcome.is_accepted(), format!("registration refused: {outcome}"))?;
    if outcome.is_confirmed() {
        return Ok(());
    }
    verify(page.is_terms_checkbox_checked()?, "terms were not accepted before submitting")
}

fn newsletter_option(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let page = open(ctx)?;
    verify(
        !page.is_newsletter_checkbox_checked()?,
        "newsletter is opted in by default",
    )?;
    let outcome = page.register_outcome(&UserRecord::valid_unique(), true)?;
    verify(outcome.is_accepted(), format!("registration with newsletter refused: {outcome}"))
}

fn login_link(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let page = open(ctx)?;
    verify(page.click_login_link()?, "login link not clickable")?;
    verify(ctx.page::<LoginPage>().is_loaded()?, "login page did not load")
}

fn validation_messages(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let page = open(ctx)?;
    let outcome = page.register_outcome(&UserRecord::invalid_email(), false)?;
    assume(!outcome.is_accepted(), "site accepted a malformed email without feedback")?;
    let messages = page.field_errors()?;
    let error = page.error_message()?;
    tracing::info!(?messages, error, "validation feedback");
    verify(
        !messages.is_empty() || !error.is_empty() || outcome.reason().is_some(),
        "malformed email refused without a message",
    )
}
