use crate::api_state::ApiContext;
use crate::people::handlers::{
    add_person_handler, delete_person_handler, get_person_handler, reminders_handler,
    update_person_handler,
};
use axum::{
    Router,
    routing::{delete, get, post, put},
};

pub fn people_router() -> Router<ApiContext> {
    Router::new()
        .route("/add_person", post(add_person_handler))
        .route("/reminders", get(reminders_handler))
        .route(
            "/person/{person_id}",
            get(get_person_handler)
                .put(update_person_handler)
                .delete(delete_person_handler),
        )
        // Paths used by the mobile client.
        .route("/edit_person/{person_id}", put(update_person_handler))
        .route("/delete_person/{person_id}", delete(delete_person_handler))
}
