pub mod api_response;
pub mod app_error;
pub mod client_info;
pub mod jwt_utils;
pub mod text_utils;
pub mod validated_wrapper;
pub mod validator_utils;
