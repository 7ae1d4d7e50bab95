use crate::harness::{assume, verify, Marker, Scenario, ScenarioContext};
use crate::page::{ForgotPasswordPage, HomePage, LoginPage, PageObject, RegistrationPage};
use crate::result::VitrineResult;
use crate::test_data::InvalidData;

const RECOVERY: &[Marker] = &[Marker::ForgotPassword];

pub(super) const SCENARIOS: &[Scenario] = &[
    Scenario::new(
        "forgot_password",
        "test_forgot_password_page_loads",
        &[Marker::ForgotPassword, Marker::Smoke],
        page_loads,
    ),
    Scenario::new("forgot_password", "test_forgot_password_form_elements", RECOVERY, form_elements),
    Scenario::new("forgot_password", "test_valid_email_reset_request", RECOVERY, valid_email),
    Scenario::new("forgot_password", "test_invalid_email_reset_request", RECOVERY, invalid_email),
    Scenario::new("forgot_password", "test_empty_email_reset_request", RECOVERY, empty_email),
    Scenario::new("forgot_password", "test_nonexistent_email_reset_request", RECOVERY, nonexistent_email),
    Scenario::new("forgot_password", "test_back_to_login_link", &[Marker::ForgotPassword, Marker::Login], back_to_login),
    Scenario::new(
        "forgot_password",
        "test_register_link_from_forgot_password",
        &[Marker::ForgotPassword, Marker::Registration],
        register_link,
    ),
    Scenario::new("forgot_password", "test_multiple_reset_requests", RECOVERY, multiple_requests),
    Scenario::new(
        "forgot_password",
        "test_forgot_password_page_security",
        &[Marker::ForgotPassword, Marker::Regression],
        page_security,
    ),
];

fn open<'s>(ctx: &ScenarioContext<'s>) -> VitrineResult<ForgotPasswordPage<'s>> {
    let page = ctx.open::<ForgotPasswordPage>()?;
    assume(page.is_loaded()?, "password recovery page not accessible")?;
    Ok(page)
}

fn page_loads(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let home = ctx.open::<HomePage>()?;
    assume(home.click_login_link()?, "could not reach the login page")?;
    let login = ctx.page::<LoginPage>();
    assume(login.is_loaded()?, "login page not accessible")?;
    let recovery = ctx.page::<ForgotPasswordPage>();
    if !login.click_forgot_password()? {
        recovery.load()?;
    }
    verify(recovery.is_loaded()?, "password recovery page did not load")
}

fn form_elements(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let page = open(ctx)?;
    verify(page.is_form_valid()?, "recovery form is incomplete")?;
    verify(!page.heading()?.is_empty(), "recovery page has no heading")
}

fn valid_email(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let page = open(ctx)?;
    let email = ctx.settings().test_user().email.clone();
    let outcome = page.reset_outcome(&email)?;
    verify(outcome.is_accepted(), format!("reset request refused: {outcome}"))?;
    if outcome.is_confirmed() {
        verify(!page.success_message()?.is_empty(), "confirmed without a message")?;
    }
    Ok(())
}

fn invalid_email(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let page = open(ctx)?;
    let outcome = page.reset_outcome(InvalidData::INVALID_EMAIL)?;
    verify(!outcome.is_confirmed(), format!("malformed email accepted: {outcome}"))
}

fn empty_email(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let page = open(ctx)?;
    let outcome = page.reset_outcome("")?;
    verify(!outcome.is_confirmed(), format!("empty email accepted: {outcome}"))
}

fn nonexistent_email(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let page = open(ctx)?;
    let outcome = page.reset_outcome(InvalidData::NONEXISTENT_EMAIL)?;
    let success = page.success_message()?;
    let error = page.error_message()?;
    tracing::info!(%outcome, success, error, "unknown email");
    verify(
        success.is_empty() || error.is_empty(),
        "success and error shown together",
    )
}

fn back_to_login(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let page = open(ctx)?;
    verify(page.click_back_to_login()?, "back to login link not clickable")?;
    verify(ctx.page::<LoginPage>().is_loaded()?, "login page did not load")
}

fn register_link(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let page = open(ctx)?;
    assume(page.click_register_link()?, "no register link on the recovery page")?;
    verify(ctx.page::<RegistrationPage>().is_loaded()?, "registration page did not load")
}

fn multiple_requests(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let page = open(ctx)?;
    let email = ctx.settings().test_user().email.clone();
    for attempt in 1..=2 {
        let outcome = page.reset_outcome(&email)?;
        verify(outcome.is_accepted(), format!("request {attempt} refused: {outcome}"))?;
    }
    Ok(())
}

fn page_security(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let page = open(ctx)?;
    let email = ctx.settings().test_user().email.clone();
    page.reset_password(&email)?;
    verify(
        !page.base().current_url()?.contains(&email),
        "email leaked into the URL",
    )
}
