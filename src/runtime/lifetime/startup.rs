use crate::cache::{ObjectCache, object_cache::MokaCacheWrapper};
use crate::config::{AppConfig, SeedUser};
use crate::errors::Result;
use crate::models::users::entities::RoleName;
use crate::models::users::requests::CreateUserRequest;
use crate::storage::Storage;
use crate::utils::password::hash_password;
use crate::utils::random_code::generate_random_password;
use crate::utils::validate::normalize_email;
use crate::views;
use std::sync::Arc;
use tracing::{debug, info, warn};

const GENERATED_PASSWORD_LENGTH: usize = 16;

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
}

/// 创建缓存实例
fn create_cache() -> Arc<dyn ObjectCache> {
    let cache = MokaCacheWrapper::default();
    warn!("Moka (in-memory) cache backend initialized");
    Arc::new(cache)
}

/// 确保三个固定角色存在
pub async fn seed_roles(storage: &Arc<dyn Storage>) -> Result<()> {
    for &role in RoleName::all() {
        let role = storage.ensure_role(role).await?;
        debug!("Role {} ready (ID: {})", role.name, role.id);
    }
    Ok(())
}

/// 创建一个初始账号，已存在时跳过
async fn seed_user(storage: &Arc<dyn Storage>, seed: &SeedUser) {
    let email = normalize_email(&seed.email);

    let role = match seed.role.parse::<RoleName>() {
        Ok(role) => role,
        Err(_) => {
            warn!("Unknown role '{}' for seed user {}, skipping", seed.role, email);
            return;
        }
    };

    match storage.get_user_by_email(&email).await {
        Ok(Some(user)) => {
            debug!("Seed user {} already exists (ID: {})", email, user.id);
            return;
        }
        Ok(None) => {
            info!("Creating seed user {} with role {}", email, role);
        }
        Err(e) => {
            warn!("Failed to look up seed user {}: {}, skipping", email, e);
            return;
        }
    }

    // 获取密码：优先使用配置，否则生成随机密码
    let password = seed.password.clone().unwrap_or_else(|| {
        let pwd = generate_random_password(GENERATED_PASSWORD_LENGTH);
        warn!("==========================================================");
        warn!("  SEED PASSWORD NOT SET FOR {} - USING GENERATED PASSWORD", email);
        warn!("  Generated password: {}", pwd);
        warn!("  Please save this password or set it under [seed.users]");
        warn!("==========================================================");
        pwd
    });

    // 哈希密码
    let password_hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(e) => {
            warn!("Failed to hash password for {}: {}, skipping", email, e);
            return;
        }
    };

    let request = CreateUserRequest {
        email: email.clone(),
        password_hash,
        role,
    };

    match storage.create_user(request).await {
        Ok(user) => {
            info!(
                "Seed user created successfully (ID: {}, email: {})",
                user.id, user.email
            );
        }
        Err(e) => {
            warn!("Failed to create seed user {}: {}", email, e);
        }
    }
}

/// 准备服务器启动的上下文
/// 包括存储、角色与初始账号、缓存以及模板
pub async fn prepare_server_startup() -> StartupContext {
    let config = AppConfig::get();

    let storage = crate::storage::create_storage()
        .await
        .expect("Failed to create storage backend");
    warn!("Storage backend initialized and migrations completed");

    seed_roles(&storage)
        .await
        .expect("Failed to create the built-in roles");

    for seed in &config.seed.users {
        seed_user(&storage, seed).await;
    }

    let cache = create_cache();

    views::init().expect("Failed to register templates");
    warn!("Templates registered");

    StartupContext { storage, cache }
}
