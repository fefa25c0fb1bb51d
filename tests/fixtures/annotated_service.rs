//! @GlobalTitle User Service API
//! @GlobalVersion 1.2.0
//! @GlobalDescription Sample API for demonstrating generation.

use crate::http::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Address {
    #[openapi(desc = "City name")]
    pub city: String,
    #[serde(rename = "zip_code")]
    pub zip: u32,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UserResponse {
    /// Unique user ID
    pub id: String,
    pub name: String,
    pub address: Address,
    #[serde(skip)]
    pub password_hash: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub address: Address,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub users: Vec<UserResponse>,
    pub total: u64,
}

/// @Summary Get user by ID
/// @Description Returns user data based on ID
/// @Tags user
/// @Param id path string true "User ID"
/// @Param id path string true "User ID"
/// @Param verbose query boolean false "Verbose output"
/// @Success 200 {object} UserResponse "The user"
/// @Failure 404 {object} ErrorResponse "User not found"
/// @Header 200 X-RateLimit-Remaining integer true "Remaining quota"
/// @Security BearerAuth
/// @Router /user/:id [get]
pub async fn get_user(ctx: &mut Context) {
    let id = ctx.param("id");
    match find_user(&id) {
        Some(user) => ctx.json(200, user),
        None => ctx.json(404, ErrorResponse { message: "not found".to_string() }),
    }
}

/// @Summary Create user
/// @Tags user, admin
/// @Security BearerAuth
/// @Router /user [post]
pub async fn create_user(ctx: &mut Context) {
    let mut req = CreateUserRequest::default();
    if ctx.bind_json(&mut req).is_err() {
        ctx.json(400, ErrorResponse { message: "invalid body".to_string() });
        return;
    }
    ctx.header("Location", "/user/1");
    ctx.json(
        201,
        UserResponse {
            id: "1".to_string(),
            name: req.name,
            address: req.address,
            password_hash: String::new(),
        },
    );
}

/// @Summary Search users
/// @Tags user
/// @Router /user/search [get]
pub async fn search_users(ctx: &mut Context) {
    let name = ctx.query("name");
    let _trace = ctx.get_header("X-Trace-ID");
    let results: SearchResults = search(&name);
    ctx.json(200, results);
}

/// @Summary Delete user
/// @Param org path string true "Organisation"
/// @Success 204 "Deleted"
/// @Security ApiKey[X-Api-Key]
/// @Deprecated
/// @Router /user/{id} [delete]
pub async fn delete_user(ctx: &mut Context) {
    let _id = ctx.param("id");
}

/// @Summary Export users
/// @Success 200 {object} ExportArchive "Archive"
/// @Router /user/export [get]
pub async fn export_users(_ctx: &mut Context) {}

/// @Summary Trace route
/// @Router /debug [trace]
pub async fn trace_debug(_ctx: &mut Context) {}

/// @Summary Health check
/// @Router /health [get]
pub async fn health(_ctx: &mut Context) {}

fn find_user(_id: &str) -> Option<UserResponse> {
    None
}

fn search(_name: &str) -> SearchResults {
    SearchResults {
        users: Vec::new(),
        total: 0,
    }
}
