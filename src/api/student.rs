use chrono::Utc;
use rocket::{http::Status, serde::json::Json, Route};

use crate::error::{Error, Result};
use crate::model::{
    auth::AuthToken,
    ballot::{BallotPost, BallotReceipt, BallotSubmission, SingleVote},
    directory::Directory,
    nomination::{Nomination, NominationSpec},
    store::Store,
    student::Student,
    vote::Vote,
};

pub fn routes() -> Vec<Route> {
    routes![profile, ballot, submit_ballot, vote, nominate]
}

/// Look up the student a token belongs to.
fn student_for(dir: &Directory, token: &AuthToken<Student>) -> Result<Student> {
    dir.student(token.id())
        .cloned()
        .ok_or_else(|| {
            Error::unauthorized(format!("No student with admission number {}", token.id()))
        })
}

#[get("/student/profile")]
async fn profile(token: AuthToken<Student>, store: Store) -> Result<Json<Student>> {
    store.read(|dir| student_for(dir, &token)).await.map(Json)
}

/// The posts the student can still vote on, with their eligible candidates.
#[get("/student/ballot")]
async fn ballot(token: AuthToken<Student>, store: Store) -> Result<Json<Vec<BallotPost>>> {
    store
        .read(|dir| -> Result<_> { Ok(Json(dir.ballot_for(&student_for(dir, &token)?))) })
        .await
}

#[post("/student/ballot", data = "<submission>", format = "json")]
async fn submit_ballot(
    token: AuthToken<Student>,
    submission: Json<BallotSubmission>,
    store: Store,
) -> Result<Json<BallotReceipt>> {
    let receipt = store
        .write(|dir| {
            let student = student_for(dir, &token)?;
            dir.submit_ballot(&student, submission.into_inner(), Utc::now())
        })
        .await?;
    Ok(Json(receipt))
}

#[post("/student/vote", data = "<vote>", format = "json")]
async fn vote(
    token: AuthToken<Student>,
    vote: Json<SingleVote>,
    store: Store,
) -> Result<(Status, Json<Vote>)> {
    let vote = store
        .write(|dir| {
            let student = student_for(dir, &token)?;
            dir.cast_vote(&student, vote.into_inner(), Utc::now())
        })
        .await?;
    Ok((Status::Created, Json(vote)))
}

#[post("/student/nominations", data = "<spec>", format = "json")]
async fn nominate(
    token: AuthToken<Student>,
    spec: Json<NominationSpec>,
    store: Store,
) -> Result<(Status, Json<Nomination>)> {
    let nomination = store
        .write(|dir| {
            let student = student_for(dir, &token)?;
            dir.submit_nomination(&student, spec.into_inner(), Utc::now())
        })
        .await?;
    Ok((Status::Created, Json(nomination)))
}
