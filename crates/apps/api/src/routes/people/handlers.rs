use crate::api_state::ApiContext;
use crate::extract::JsonBody;
use axum::Json;
use axum::extract::{Path, State};
use common_services::api::people::error::PeopleError;
use common_services::api::people::interfaces::{
    AddPersonRequest, AddPersonResponse, DeletePersonResponse, PersonResponse, RemindersResponse,
    UpdatePersonRequest, UpdatePersonResponse,
};
use common_services::api::people::service::{
    add_person, delete_person, get_person, list_reminders, update_person,
};
use tracing::info;

/// Enroll a person, or update them when their face is already known.
#[utoipa::path(
    post,
    path = "/add_person",
    tag = "People",
    request_body = AddPersonRequest,
    responses(
        (status = 200, description = "Person created, or an existing person updated.", body = AddPersonResponse),
        (status = 400, description = "Missing fields, bad image, or no face in the photo."),
        (status = 500, description = "A collaborator failed. Partial enrollments are rolled back."),
    )
)]
pub async fn add_person_handler(
    State(context): State<ApiContext>,
    JsonBody(payload): JsonBody<AddPersonRequest>,
) -> Result<Json<AddPersonResponse>, PeopleError> {
    let response = add_person(&context.collaborators, &context.settings, payload).await?;
    Ok(Json(response))
}

/// Everyone the patient knows, oldest first.
#[utoipa::path(
    get,
    path = "/reminders",
    tag = "People",
    responses(
        (status = 200, description = "All people as reminders.", body = RemindersResponse),
        (status = 500, description = "The record store failed."),
    )
)]
pub async fn reminders_handler(
    State(context): State<ApiContext>,
) -> Result<Json<RemindersResponse>, PeopleError> {
    Ok(Json(list_reminders(&context.collaborators).await?))
}

#[utoipa::path(
    get,
    path = "/person/{person_id}",
    tag = "People",
    params(
        ("person_id" = String, Path, description = "Id of the person.")
    ),
    responses(
        (status = 200, description = "The person with a link to their primary photo.", body = PersonResponse),
        (status = 404, description = "No such person."),
    )
)]
pub async fn get_person_handler(
    State(context): State<ApiContext>,
    Path(person_id): Path<String>,
) -> Result<Json<PersonResponse>, PeopleError> {
    Ok(Json(get_person(&context.collaborators, &person_id).await?))
}

/// Update a person's details. Omitted fields are kept, `images` are added to the gallery.
///
/// Also served at `PUT /edit_person/{person_id}`.
#[utoipa::path(
    put,
    path = "/person/{person_id}",
    tag = "People",
    params(
        ("person_id" = String, Path, description = "Id of the person.")
    ),
    request_body = UpdatePersonRequest,
    responses(
        (status = 200, description = "The updated person.", body = UpdatePersonResponse),
        (status = 400, description = "Invalid field or image."),
        (status = 404, description = "No such person."),
    )
)]
pub async fn update_person_handler(
    State(context): State<ApiContext>,
    Path(person_id): Path<String>,
    JsonBody(payload): JsonBody<UpdatePersonRequest>,
) -> Result<Json<UpdatePersonResponse>, PeopleError> {
    let response =
        update_person(&context.collaborators, &context.settings, &person_id, payload).await?;
    Ok(Json(response))
}

/// Delete a person's faces, photos and record, in that order.
///
/// A 500 response means the deletion stopped part way; repeating the request finishes it.
/// Also served at `DELETE /delete_person/{person_id}`.
#[utoipa::path(
    delete,
    path = "/person/{person_id}",
    tag = "People",
    params(
        ("person_id" = String, Path, description = "Id of the person.")
    ),
    responses(
        (status = 200, description = "Everything about the person was removed.", body = DeletePersonResponse),
        (status = 404, description = "Nothing is stored for this id."),
        (status = 500, description = "Deletion stopped part way, retry to finish."),
    )
)]
pub async fn delete_person_handler(
    State(context): State<ApiContext>,
    Path(person_id): Path<String>,
) -> Result<Json<DeletePersonResponse>, PeopleError> {
    info!("Delete person {person_id}");
    Ok(Json(delete_person(&context.collaborators, &person_id).await?))
}
