mod app_config;
mod atleta;
mod user;

pub use app_config::AppConfig;
pub use atleta::{
    merge_record_patch, new_record_id, Atleta, Endereco, Escolar, Responsavel, Saude,
};
pub use user::{
    AppUser, LoginRequest, LoginResponse, MeResponse, RegisterRequest, RegisterResponse, UserRole,
};
