use app_state::AppSettings;
use axum::extract::FromRef;
use common_services::collaborators::Collaborators;

#[derive(Clone)]
pub struct ApiContext {
    pub collaborators: Collaborators,
    pub settings: AppSettings,
}

impl FromRef<ApiContext> for Collaborators {
    fn from_ref(state: &ApiContext) -> Self {
        state.collaborators.clone()
    }
}

impl FromRef<ApiContext> for AppSettings {
    fn from_ref(state: &ApiContext) -> Self {
        state.settings.clone()
    }
}
