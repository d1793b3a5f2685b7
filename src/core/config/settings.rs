use super::parsing::{
    check_bounded, env_flag, env_optional, env_or_default, is_supported_image_extension,
    parse_cors_origins, parse_environment, parse_string_list, parse_u16, parse_u64,
    SUPPORTED_IMAGE_EXTENSIONS,
};
use super::secret::load_or_create_secret_key;
use super::types::{
    AdminSettings, ApiSettings, ConfigError, CorsSettings, DatabaseSettings, EmailSettings,
    GoogleSettings, RedisSettings, RuntimeSettings, S3Settings, SecuritySettings, ServerHost,
    ServerPort, ServerSettings, Settings, StorageSettings, TelemetrySettings,
};

const MAX_TOKEN_SECONDS: u64 = 366 * 24 * 60 * 60;
const MAX_OTP_MINUTES: u64 = 24 * 60;
// S3 rejects presigned URLs valid for longer than seven days.
const MAX_PRESIGNED_URL_MINUTES: u64 = 7 * 24 * 60;
const MAX_UPLOAD_MB: u64 = 1024;

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_or_default("IELTS_HOST", "0.0.0.0");
        let port = env_or_default("IELTS_PORT", "8000");

        let environment =
            parse_environment(env_optional("IELTS_ENV").or_else(|| env_optional("ENVIRONMENT")));
        let strict_config = env_flag("IELTS_STRICT_CONFIG") || environment.is_production();

        let project_name = env_or_default("PROJECT_NAME", "IELTS Platform API");
        let version = env_or_default("VERSION", env!("CARGO_PKG_VERSION"));
        let api_v1_str = env_or_default("API_V1_STR", "/api/v1");

        let secret_key = match env_optional("SECRET_KEY") {
            Some(value) => value,
            None => load_or_create_secret_key(),
        };
        let algorithm = env_or_default("ALGORITHM", "HS256");
        let access_token_expire_seconds = parse_u64(
            "ACCESS_TOKEN_EXPIRE_SECONDS",
            env_or_default("ACCESS_TOKEN_EXPIRE_SECONDS", "900"),
        )?;
        let refresh_token_expire_seconds = parse_u64(
            "REFRESH_TOKEN_EXPIRE_SECONDS",
            env_or_default("REFRESH_TOKEN_EXPIRE_SECONDS", "2592000"),
        )?;
        let otp_expire_minutes =
            parse_u64("OTP_EXPIRE_MINUTES", env_or_default("OTP_EXPIRE_MINUTES", "5"))?;

        let cors_origins = parse_cors_origins(env_optional("BACKEND_CORS_ORIGINS"))?;

        let postgres_server = env_or_default("POSTGRES_SERVER", "localhost");
        let postgres_port = parse_u16("POSTGRES_PORT", env_or_default("POSTGRES_PORT", "5432"))?;
        let postgres_user = env_or_default("POSTGRES_USER", "ielts");
        let postgres_password = env_or_default("POSTGRES_PASSWORD", "");
        let postgres_db = env_or_default("POSTGRES_DB", "ielts_platform");
        let database_url = env_optional("DATABASE_URL");

        let redis_host = env_or_default("REDIS_HOST", "localhost");
        let redis_port = parse_u16("REDIS_PORT", env_or_default("REDIS_PORT", "6379"))?;
        let redis_db = parse_u16("REDIS_DB", env_or_default("REDIS_DB", "0"))?;
        let redis_password = env_or_default("REDIS_PASSWORD", "");

        let max_upload_size_mb =
            parse_u64("MAX_UPLOAD_SIZE_MB", env_or_default("MAX_UPLOAD_SIZE_MB", "10"))?;
        let max_audio_upload_size_mb = parse_u64(
            "MAX_AUDIO_UPLOAD_SIZE_MB",
            env_or_default("MAX_AUDIO_UPLOAD_SIZE_MB", "50"),
        )?;
        let allowed_image_extensions = parse_string_list(
            env_optional("ALLOWED_IMAGE_EXTENSIONS"),
            SUPPORTED_IMAGE_EXTENSIONS,
        );
        let presigned_url_expire_minutes = parse_u64(
            "PRESIGNED_URL_EXPIRE_MINUTES",
            env_or_default("PRESIGNED_URL_EXPIRE_MINUTES", "15"),
        )?;

        let s3_endpoint = env_or_default("S3_ENDPOINT", "");
        let s3_access_key = env_or_default("S3_ACCESS_KEY", "");
        let s3_secret_key = env_or_default("S3_SECRET_KEY", "");
        let s3_bucket = env_or_default("S3_BUCKET", "ielts-platform");
        let s3_region = env_or_default("S3_REGION", "us-east-1");
        let s3_public_base_url = env_optional("S3_PUBLIC_BASE_URL")
            .map(|value| value.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("https://{s3_bucket}.s3.amazonaws.com"));

        let email = EmailSettings {
            enabled: env_flag("SMTP_ENABLED"),
            smtp_host: env_or_default("SMTP_HOST", "localhost"),
            smtp_port: parse_u16("SMTP_PORT", env_or_default("SMTP_PORT", "1025"))?,
            smtp_username: env_or_default("SMTP_USERNAME", ""),
            smtp_password: env_or_default("SMTP_PASSWORD", ""),
            from_email: env_or_default("FROM_EMAIL", "noreply@ielts-platform.local"),
            from_name: env_or_default("FROM_NAME", "IELTS Platform"),
        };

        let google = GoogleSettings {
            client_id: env_or_default("GOOGLE_CLIENT_ID", ""),
            tokeninfo_url: env_or_default(
                "GOOGLE_TOKENINFO_URL",
                "https://oauth2.googleapis.com/tokeninfo",
            ),
        };

        let first_superuser_email =
            env_or_default("FIRST_SUPERUSER_EMAIL", "admin@ielts-platform.local")
                .to_ascii_lowercase();
        let first_superuser_password = env_or_default("FIRST_SUPERUSER_PASSWORD", "");

        let log_level = env_or_default("IELTS_LOG_LEVEL", "info");
        let json = env_flag("IELTS_LOG_JSON");
        let prometheus_enabled = env_flag("PROMETHEUS_ENABLED");

        let settings = Self {
            server: ServerSettings {
                host: ServerHost::parse(host)?,
                port: ServerPort::parse(port)?,
            },
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings { project_name, version, api_v1_str },
            security: SecuritySettings {
                secret_key,
                algorithm,
                access_token_expire_seconds,
                refresh_token_expire_seconds,
                otp_expire_minutes,
            },
            cors: CorsSettings { origins: cors_origins },
            database: DatabaseSettings {
                postgres_server,
                postgres_port,
                postgres_user,
                postgres_password,
                postgres_db,
                database_url,
            },
            redis: RedisSettings {
                host: redis_host,
                port: redis_port,
                db: redis_db,
                password: redis_password,
            },
            storage: StorageSettings {
                max_upload_size_mb,
                max_audio_upload_size_mb,
                allowed_image_extensions,
                presigned_url_expire_minutes,
            },
            s3: S3Settings {
                endpoint: s3_endpoint,
                access_key: s3_access_key,
                secret_key: s3_secret_key,
                bucket: s3_bucket,
                region: s3_region,
                public_base_url: s3_public_base_url,
            },
            email,
            google,
            admin: AdminSettings { first_superuser_email, first_superuser_password },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate()?;
        Ok(settings)
    }

    pub(crate) fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host.0, self.server.port.0)
    }

    pub(crate) fn server_host(&self) -> &str {
        &self.server.host.0
    }

    pub(crate) fn server_port(&self) -> u16 {
        self.server.port.0
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn security(&self) -> &SecuritySettings {
        &self.security
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn redis(&self) -> &RedisSettings {
        &self.redis
    }

    pub(crate) fn storage(&self) -> &StorageSettings {
        &self.storage
    }

    pub(crate) fn s3(&self) -> &S3Settings {
        &self.s3
    }

    pub(crate) fn email(&self) -> &EmailSettings {
        &self.email
    }

    pub(crate) fn google(&self) -> &GoogleSettings {
        &self.google
    }

    pub(crate) fn admin(&self) -> &AdminSettings {
        &self.admin
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.allowed_image_extensions.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "ALLOWED_IMAGE_EXTENSIONS",
                value: String::from("<empty>"),
            });
        }

        for extension in &self.storage.allowed_image_extensions {
            if !is_supported_image_extension(extension) {
                return Err(ConfigError::InvalidValue {
                    field: "ALLOWED_IMAGE_EXTENSIONS",
                    value: extension.clone(),
                });
            }
        }

        let bounded = [
            (
                "ACCESS_TOKEN_EXPIRE_SECONDS",
                self.security.access_token_expire_seconds,
                MAX_TOKEN_SECONDS,
            ),
            (
                "REFRESH_TOKEN_EXPIRE_SECONDS",
                self.security.refresh_token_expire_seconds,
                MAX_TOKEN_SECONDS,
            ),
            ("OTP_EXPIRE_MINUTES", self.security.otp_expire_minutes, MAX_OTP_MINUTES),
            (
                "PRESIGNED_URL_EXPIRE_MINUTES",
                self.storage.presigned_url_expire_minutes,
                MAX_PRESIGNED_URL_MINUTES,
            ),
            ("MAX_UPLOAD_SIZE_MB", self.storage.max_upload_size_mb, MAX_UPLOAD_MB),
            ("MAX_AUDIO_UPLOAD_SIZE_MB", self.storage.max_audio_upload_size_mb, MAX_UPLOAD_MB),
        ];
        for (field, value, max) in bounded {
            check_bounded(field, value, max)?;
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if self.database.database_url.is_none() && self.database.postgres_password.is_empty() {
            return Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"));
        }
        if !self.s3.is_configured() {
            return Err(ConfigError::MissingSecret("S3_ACCESS_KEY/S3_SECRET_KEY"));
        }
        if self.admin.first_superuser_password.is_empty() {
            return Err(ConfigError::MissingSecret("FIRST_SUPERUSER_PASSWORD"));
        }
        if self.email.enabled && self.email.smtp_host.is_empty() {
            return Err(ConfigError::MissingSecret("SMTP_HOST"));
        }

        Ok(())
    }
}
