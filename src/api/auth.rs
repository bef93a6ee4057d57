use rocket::{
    http::{Cookie, CookieJar, Status},
    serde::json::Json,
    Route, State,
};

use crate::error::{Error, Result};
use crate::model::{
    admin::{Admin, AdminCredentials},
    audit::LogKind,
    auth::{AuthToken, AUTH_TOKEN_COOKIE},
    store::Store,
    student::{Registration, Student, StudentCredentials},
};
use crate::Config;

pub fn routes() -> Vec<Route> {
    routes![authenticate, register, login, logout]
}

#[post("/auth/admin", data = "<credentials>", format = "json")]
pub async fn authenticate(
    cookies: &CookieJar<'_>,
    credentials: Json<AdminCredentials>,
    store: Store,
    config: &State<Config>,
) -> Result<()> {
    let admin = store.write(|dir| dir.login_admin(&credentials)).await?;

    let token = AuthToken::new(&admin);
    cookies.add(token.into_cookie(config)?);

    Ok(())
}

#[post("/auth/student/register", data = "<registration>", format = "json")]
pub async fn register(
    registration: Json<Registration>,
    store: Store,
) -> Result<(Status, Json<Student>)> {
    let student = store
        .write(|dir| dir.register_student(registration.into_inner()))
        .await?;
    Ok((Status::Created, Json(student)))
}

#[post("/auth/student/login", data = "<credentials>", format = "json")]
pub async fn login(
    cookies: &CookieJar<'_>,
    credentials: Json<StudentCredentials>,
    store: Store,
    config: &State<Config>,
) -> Result<Json<Student>> {
    let student = store.write(|dir| dir.login_student(&credentials)).await?;

    let token = AuthToken::new(&student);
    cookies.add(token.into_cookie(config)?);

    Ok(Json(student))
}

#[delete("/auth")]
pub async fn logout(
    cookies: &CookieJar<'_>,
    admin: Option<AuthToken<Admin>>,
    store: Store,
) -> Result<Status> {
    cookies.remove(Cookie::named(AUTH_TOKEN_COOKIE));
    if admin.is_some() {
        store
            .write(|dir| {
                dir.log(LogKind::Logout, "Admin logged out");
                Ok::<_, Error>(())
            })
            .await?;
    }
    Ok(Status::Ok)
}
