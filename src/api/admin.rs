use rocket::{
    http::{ContentType, Status},
    serde::json::{json, Json},
    Route,
};

use crate::error::{Error, Result};
use crate::model::{
    admin::{AcademicYear, Admin, Deadline, PasswordChange},
    audit::{LogEntry, LogKind},
    auth::AuthToken,
    candidate::{Candidate, CandidateSpec},
    directory::required,
    export::{to_csv, ExportBy},
    nomination::Nomination,
    post::Post,
    results::PostResult,
    roster::{NameSpec, PostSpec},
    store::Store,
    student::Student,
    vote::Vote,
};

pub fn routes() -> Vec<Route> {
    routes![
        classes,
        add_class,
        delete_class,
        dorms,
        add_dorm,
        delete_dorm,
        posts,
        add_post,
        delete_post,
        candidates,
        add_candidate,
        delete_candidate,
        nominations,
        approve_nomination,
        reject_nomination,
        change_password,
        set_academic_year,
        set_deadline,
        publish_results,
        unpublish_results,
        live_results,
        students,
        votes,
        logs,
        export,
    ]
}

#[get("/admin/classes")]
async fn classes(_token: AuthToken<Admin>, store: Store) -> Json<Vec<String>> {
    Json(store.read(|dir| dir.classes.clone()).await)
}

#[post("/admin/classes", data = "<spec>", format = "json")]
async fn add_class(
    _token: AuthToken<Admin>,
    spec: Json<NameSpec>,
    store: Store,
) -> Result<(Status, Json<String>)> {
    let name = store.write(|dir| dir.add_class(spec.into_inner())).await?;
    Ok((Status::Created, Json(name)))
}

/// Delete a class, its candidates and its nominations. Returns whether the class existed.
#[delete("/admin/classes/<name>")]
async fn delete_class(
    _token: AuthToken<Admin>,
    name: String,
    store: Store,
) -> Result<Json<bool>> {
    store
        .write(|dir| Ok::<_, Error>(Json(dir.delete_class(&name))))
        .await
}

#[get("/admin/dorms")]
async fn dorms(_token: AuthToken<Admin>, store: Store) -> Json<Vec<String>> {
    Json(store.read(|dir| dir.dorms.clone()).await)
}

#[post("/admin/dorms", data = "<spec>", format = "json")]
async fn add_dorm(
    _token: AuthToken<Admin>,
    spec: Json<NameSpec>,
    store: Store,
) -> Result<(Status, Json<String>)> {
    let name = store.write(|dir| dir.add_dorm(spec.into_inner())).await?;
    Ok((Status::Created, Json(name)))
}

/// Delete a dorm, its candidates and its nominations. Returns whether the dorm existed.
#[delete("/admin/dorms/<name>")]
async fn delete_dorm(
    _token: AuthToken<Admin>,
    name: String,
    store: Store,
) -> Result<Json<bool>> {
    store
        .write(|dir| Ok::<_, Error>(Json(dir.delete_dorm(&name))))
        .await
}

#[get("/admin/posts")]
async fn posts(_token: AuthToken<Admin>, store: Store) -> Json<Vec<Post>> {
    Json(store.read(|dir| dir.posts.clone()).await)
}

#[post("/admin/posts", data = "<spec>", format = "json")]
async fn add_post(
    _token: AuthToken<Admin>,
    spec: Json<PostSpec>,
    store: Store,
) -> Result<(Status, Json<Post>)> {
    let post = store.write(|dir| dir.add_post(spec.into_inner())).await?;
    Ok((Status::Created, Json(post)))
}

/// Delete a post with its candidates, nominations and votes. Returns whether the post existed.
#[delete("/admin/posts/<name>")]
async fn delete_post(
    _token: AuthToken<Admin>,
    name: String,
    store: Store,
) -> Result<Json<bool>> {
    store
        .write(|dir| Ok::<_, Error>(Json(dir.delete_post(&name))))
        .await
}

#[get("/admin/candidates")]
async fn candidates(_token: AuthToken<Admin>, store: Store) -> Json<Vec<Candidate>> {
    Json(store.read(|dir| dir.candidates.clone()).await)
}

#[post("/admin/candidates", data = "<spec>", format = "json")]
async fn add_candidate(
    _token: AuthToken<Admin>,
    spec: Json<CandidateSpec>,
    store: Store,
) -> Result<(Status, Json<Candidate>)> {
    let candidate = store
        .write(|dir| dir.add_candidate(spec.into_inner(), chrono::Utc::now()))
        .await?;
    Ok((Status::Created, Json(candidate)))
}

#[delete("/admin/candidates/<id>")]
async fn delete_candidate(
    _token: AuthToken<Admin>,
    id: String,
    store: Store,
) -> Result<Json<bool>> {
    store
        .write(|dir| Ok::<_, Error>(Json(dir.delete_candidate(&id))))
        .await
}

/// Nominations awaiting a decision.
#[get("/admin/nominations")]
async fn nominations(_token: AuthToken<Admin>, store: Store) -> Json<Vec<Nomination>> {
    Json(
        store
            .read(|dir| dir.pending_nominations().cloned().collect::<Vec<_>>())
            .await,
    )
}

#[post("/admin/nominations/<id>/approve")]
async fn approve_nomination(
    _token: AuthToken<Admin>,
    id: String,
    store: Store,
) -> Result<Json<bool>> {
    store
        .write(|dir| dir.approve_nomination(&id).map(|candidate| Json(candidate.is_some())))
        .await
}

#[post("/admin/nominations/<id>/reject")]
async fn reject_nomination(
    _token: AuthToken<Admin>,
    id: String,
    store: Store,
) -> Result<Json<bool>> {
    store
        .write(|dir| Ok::<_, Error>(Json(dir.reject_nomination(&id).is_some())))
        .await
}

#[put("/admin/password", data = "<change>", format = "json")]
async fn change_password(
    _token: AuthToken<Admin>,
    change: Json<PasswordChange>,
    store: Store,
) -> Result<()> {
    store.write(|dir| dir.change_admin_password(&change)).await
}

/// Switch every collection over to another academic year.
#[put("/admin/year", data = "<year>", format = "json")]
async fn set_academic_year(
    _token: AuthToken<Admin>,
    year: Json<AcademicYear>,
    store: Store,
) -> Result<()> {
    let year = required("Academic year", &year.academic_year)?;
    store
        .switch_year(&year, |dir| {
            dir.log(LogKind::Year, format!("Academic year set to {year}"));
            Ok::<_, Error>(())
        })
        .await
}

#[put("/admin/deadline", data = "<deadline>", format = "json")]
async fn set_deadline(
    _token: AuthToken<Admin>,
    deadline: Json<Deadline>,
    store: Store,
) -> Result<()> {
    store
        .write(|dir| {
            dir.set_deadline(deadline.deadline);
            Ok(())
        })
        .await
}

#[post("/admin/results/publish")]
async fn publish_results(_token: AuthToken<Admin>, store: Store) -> Result<()> {
    store
        .write(|dir| {
            dir.set_results_published(true);
            Ok(())
        })
        .await
}

#[post("/admin/results/unpublish")]
async fn unpublish_results(_token: AuthToken<Admin>, store: Store) -> Result<()> {
    store
        .write(|dir| {
            dir.set_results_published(false);
            Ok(())
        })
        .await
}

/// Current standings, published or not.
#[get("/admin/results")]
async fn live_results(_token: AuthToken<Admin>, store: Store) -> Json<Vec<PostResult>> {
    Json(store.read(|dir| dir.live_results()).await)
}

#[get("/admin/students")]
async fn students(_token: AuthToken<Admin>, store: Store) -> Json<Vec<Student>> {
    Json(store.read(|dir| dir.students.clone()).await)
}

#[get("/admin/votes")]
async fn votes(_token: AuthToken<Admin>, store: Store) -> Json<Vec<Vote>> {
    Json(store.read(|dir| dir.votes.clone()).await)
}

/// The audit log, newest first.
#[get("/admin/logs")]
async fn logs(_token: AuthToken<Admin>, store: Store) -> Json<Vec<LogEntry>> {
    Json(store.read(|dir| dir.logs.clone()).await)
}

/// Votes filtered by class, dorm or post, as CSV.
#[get("/admin/export?<by>&<value>")]
async fn export(
    _token: AuthToken<Admin>,
    by: ExportBy,
    value: String,
    store: Store,
) -> Result<(ContentType, String)> {
    let csv = store
        .write(|dir| {
            let rows = dir.export_votes(by, &value);
            if rows.is_empty() {
                return Err(Error::not_found("No data found"));
            }
            dir.log_with(
                LogKind::Export,
                format!("Exported {} votes", rows.len()),
                json!({ "by": by, "value": value }),
            );
            Ok(to_csv(&rows))
        })
        .await?;
    Ok((ContentType::CSV, csv))
}
