use rocket::Route;

mod admin;
mod auth;
mod public;
mod student;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(admin::routes());
    routes.extend(auth::routes());
    routes.extend(public::routes());
    routes.extend(student::routes());
    routes
}
