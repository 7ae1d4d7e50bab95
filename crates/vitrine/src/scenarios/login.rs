use crate::harness::{assume, verify, Marker, Scenario, ScenarioContext};
use crate::page::{ForgotPasswordPage, HomePage, LoginPage, PageObject, RegistrationPage};
use crate::result::VitrineResult;
use crate::test_data::InvalidData;

pub(super) const SCENARIOS: &[Scenario] = &[
    Scenario::new("login", "test_login_page_loads", &[Marker::Login, Marker::Smoke], login_page_loads),
    Scenario::new("login", "test_valid_login", &[Marker::Login, Marker::Smoke], valid_login),
    Scenario::new("login", "test_invalid_email_login", &[Marker::Login], invalid_email_login),
    Scenario::new("login", "test_empty_credentials_login", &[Marker::Login], empty_credentials_login),
    Scenario::new("login", "test_nonexistent_user_login", &[Marker::Login], nonexistent_user_login),
    Scenario::new("login", "test_wrong_password_login", &[Marker::Login], wrong_password_login),
    Scenario::new("login", "test_remember_me_functionality", &[Marker::Login], remember_me),
    Scenario::new("login", "test_forgot_password_link", &[Marker::Login, Marker::ForgotPassword], forgot_password_link),
    Scenario::new("login", "test_create_account_link", &[Marker::Login, Marker::Registration], create_account_link),
    Scenario::new("login", "test_login_form_validation", &[Marker::Login], form_validation),
    Scenario::new("login", "test_login_page_elements", &[Marker::Login, Marker::Regression], page_elements),
    Scenario::new("login", "test_login_security_features", &[Marker::Login, Marker::Regression], security_features),
];

fn login_page_loads(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let home = ctx.open::<HomePage>()?;
    verify(home.click_login_link()?, "login link not clickable")?;
    let login = ctx.page::<LoginPage>();
    verify(login.is_loaded()?, "login page did not load")?;
    verify(login.is_form_valid()?, "login form is incomplete")
}

fn valid_login(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let login = ctx.open::<LoginPage>()?;
    let user = ctx.settings().test_user();
    let outcome = login.login_outcome(&user.email, &user.password, false)?;
    assume(outcome.is_accepted(), format!("test account was refused: {outcome}"))?;
    verify(
        !login.base().url_contains("login")?,
        "still on the login page after signing in",
    )
}

/// Rejected one way or another: refused outright, or no confirmation at all
fn verify_not_signed_in(login: &LoginPage<'_>, email: &str, password: &str, what: &str) -> VitrineResult<()> {
    let outcome = login.login_outcome(email, password, false)?;
    tracing::info!(%outcome, what, "login attempt");
    verify(!outcome.is_confirmed(), format!("{what} signed in: {outcome}"))
}

fn invalid_email_login(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let login = ctx.open::<LoginPage>()?;
    verify_not_signed_in(&login, InvalidData::INVALID_EMAIL, "somepassword", "malformed email")
}

fn empty_credentials_login(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let login = ctx.open::<LoginPage>()?;
    verify(!login.login("", "", false)? || !login.error_message()?.is_empty(), "empty credentials accepted")?;
    verify_not_signed_in(&login, "", "", "empty credentials")
}

fn nonexistent_user_login(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let login = ctx.open::<LoginPage>()?;
    verify_not_signed_in(
        &login,
        InvalidData::NONEXISTENT_EMAIL,
        InvalidData::WRONG_PASSWORD,
        "unknown account",
    )
}

fn wrong_password_login(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let login = ctx.open::<LoginPage>()?;
    let email = ctx.settings().test_user().email.clone();
    verify_not_signed_in(&login, &email, InvalidData::WRONG_PASSWORD, "wrong password")
}

fn remember_me(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let login = ctx.open::<LoginPage>()?;
    let email = ctx.settings().test_user().email.clone();
    let outcome = login.login_outcome(&email, InvalidData::WRONG_PASSWORD, true)?;
    assume(!outcome.is_confirmed(), "left the login page")?;
    verify(login.is_remember_me_checked()?, "remember me was not ticked")
}

fn forgot_password_link(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let login = ctx.open::<LoginPage>()?;
    verify(login.click_forgot_password()?, "forgot password link not clickable")?;
    verify(
        ctx.page::<ForgotPasswordPage>().is_loaded()?,
        "password recovery page did not load",
    )
}

fn create_account_link(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let login = ctx.open::<LoginPage>()?;
    verify(login.click_create_account()?, "create account link not clickable")?;
    verify(
        ctx.page::<RegistrationPage>().is_loaded()?,
        "registration page did not load",
    )
}

fn form_validation(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let login = ctx.open::<LoginPage>()?;
    verify(login.is_form_valid()?, "login form is incomplete")?;
    login.clear_form()?;
    let outcome = login.login_outcome("", "", false)?;
    verify(!outcome.is_confirmed(), "blank form was accepted")?;
    if let Some(reason) = outcome.reason() {
        tracing::info!(reason, "blank form rejected");
    }
    Ok(())
}

fn page_elements(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let login = ctx.open::<LoginPage>()?;
    verify(login.is_loaded()?, "login page did not load")?;
    verify(login.is_form_valid()?, "login form is incomplete")?;
    verify(!login.heading()?.is_empty(), "login page has no heading")
}

fn security_features(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
    let login = ctx.open::<LoginPage>()?;
    let user = ctx.settings().test_user();
    login.login(&user.email, &user.password, false)?;
    let url = login.base().current_url()?;
    verify(!url.contains(&user.password), "password leaked into the URL")?;
    verify(!url.contains(&user.email), "email leaked into the URL")
}
