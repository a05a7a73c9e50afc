use crate::routes::{media, people, recognize, root, storage};
use common_services::api::media::interfaces::{
    AddMediaRequest, AddMediaResponse, DeleteMediaResponse, MediaItem, MediaListResponse,
};
use common_services::api::people::interfaces::{
    AddPersonRequest, AddPersonResponse, DeletePersonResponse, DeletionStep, PersonResponse,
    ReminderItem, RemindersResponse, UpdatePersonRequest, UpdatePersonResponse,
};
use common_services::api::recognize::interfaces::{
    RecognizeRequest, RecognizeResponse, RecognizedPerson,
};
use common_services::database::Person;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        root::handlers::root,
        root::handlers::health_check,
        root::handlers::openapi_json,
        // Recognition
        recognize::handlers::recognize_handler,
        // People
        people::handlers::add_person_handler,
        people::handlers::reminders_handler,
        people::handlers::get_person_handler,
        people::handlers::update_person_handler,
        people::handlers::delete_person_handler,
        // Media
        media::handlers::list_media_handler,
        media::handlers::add_media_handler,
        media::handlers::delete_media_handler,
        // Storage
        storage::handlers::fetch_object_handler,
    ),
    components(
        schemas(
            Person,
            RecognizeRequest,
            RecognizeResponse,
            RecognizedPerson,
            AddPersonRequest,
            AddPersonResponse,
            UpdatePersonRequest,
            UpdatePersonResponse,
            PersonResponse,
            DeletePersonResponse,
            DeletionStep,
            ReminderItem,
            RemindersResponse,
            AddMediaRequest,
            AddMediaResponse,
            DeleteMediaResponse,
            MediaItem,
            MediaListResponse,
            root::handlers::HealthResponse,
        ),
    ),
    tags(
        (name = "Recognition", description = "Match a camera frame and announce the person"),
        (name = "People", description = "Enroll, edit and remove known people"),
        (name = "Media", description = "Per-person photo galleries"),
        (name = "Storage", description = "Presigned object access"),
        (name = "System", description = "Health check and service metadata"),
    )
)]
pub struct ApiDoc;
