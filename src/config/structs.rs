use serde::{Deserialize, Serialize};

/// 应用配置结构体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub session: SessionConfig,
    pub argon2: Argon2Config,
    pub seed: SeedConfig,
}

/// 应用设置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub system_name: String,
    pub environment: String,
    pub log_level: String,
    /// 是否开放 /register 自助注册（仅允许学生角色）
    pub allow_self_registration: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            system_name: "CourseDesk".to_string(),
            environment: "development".to_string(),
            log_level: "info".to_string(),
            allow_self_registration: true,
        }
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub unix_socket_path: String,
    pub workers: usize,
    pub max_workers: usize,
    pub timeouts: TimeoutConfig,
    pub limits: LimitConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            unix_socket_path: String::new(),
            workers: 0,
            max_workers: 8,
            timeouts: TimeoutConfig::default(),
            limits: LimitConfig::default(),
        }
    }
}

/// 超时配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub client_request: u64,
    pub client_disconnect: u64,
    pub keep_alive: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            client_request: 5000,
            client_disconnect: 1000,
            keep_alive: 30,
        }
    }
}

/// 限制配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitConfig {
    pub max_payload_size: usize,
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            max_payload_size: 64 * 1024,
        }
    }
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,    // 数据库连接 URL（从 scheme 自动推断类型）
    pub pool_size: u32, // 连接池大小
    pub timeout: u64,   // 连接超时 (秒)
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "coursedesk.db".to_string(),
            pool_size: 8,
            timeout: 10,
        }
    }
}

/// 缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub default_ttl: u64,
    pub memory: MemoryConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: 3600,
            memory: MemoryConfig::default(),
        }
    }
}

/// 内存缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub max_capacity: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
        }
    }
}

/// 会话配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub cookie_name: String,
    /// 会话有效期（秒）
    pub ttl: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "coursedesk_session".to_string(),
            ttl: 60 * 60 * 12,
        }
    }
}

/// Argon2 参数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Argon2Config {
    pub memory_cost: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            memory_cost: 19 * 1024,
            time_cost: 2,
            parallelism: 1,
        }
    }
}

/// 启动时创建的初始账号
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub users: Vec<SeedUser>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            users: vec![SeedUser {
                email: "admin@localhost".to_string(),
                role: "Admin".to_string(),
                password: None,
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUser {
    pub email: String,
    pub role: String,
    #[serde(skip_serializing, default)] // 不输出明文密码
    pub password: Option<String>,
}
