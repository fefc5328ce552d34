use crate::config::AuthConfig;
use crate::entities::{UserRole, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::models::{AuthResponse, LoginRequest, SetupRequest, UserResponse};
use crate::utils::{
    JwtService, hash_password, normalize_email, validate_email, validate_password,
    verify_password,
};
use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, Set,
};

#[derive(Clone)]
pub struct AuthService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
    config: AuthConfig,
}

fn required(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl AuthService {
    pub fn new(pool: DatabaseConnection, jwt_service: JwtService, config: AuthConfig) -> Self {
        Self {
            pool,
            jwt_service,
            config,
        }
    }

    /// Username or e-mail login with lockout after repeated failures.
    ///
    /// A lock that has already expired is cleared first, so the user starts
    /// again from a full set of attempts. While a lock is in force the password
    /// is not checked at all.
    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let (Some(identifier), Some(password)) =
            (required(request.username), request.password.filter(|p| !p.is_empty()))
        else {
            return Err(AppError::ValidationError(
                "Username and password are required".to_string(),
            ));
        };

        let user = users::Entity::find()
            .filter(
                Condition::any()
                    .add(users::Column::Username.eq(identifier.as_str()))
                    .add(users::Column::Email.eq(normalize_email(&identifier))),
            )
            .filter(users::Column::IsActive.eq(true))
            .one(&self.pool)
            .await?
            .ok_or(AppError::InvalidCredentials {
                attempts_left: None,
            })?;

        let now = Utc::now();
        let mut attempts = user.login_attempts;
        if let Some(lock_until) = user.lock_until {
            if lock_until > now {
                return Err(AppError::AccountLocked { lock_until });
            }
            attempts = 0;
        }

        let mut active = user.clone().into_active_model();

        if !verify_password(&password, &user.password_hash)? {
            attempts += 1;
            active.login_attempts = Set(attempts);

            if attempts >= self.config.max_login_attempts {
                let lock_until = now + Duration::minutes(self.config.lock_minutes);
                active.lock_until = Set(Some(lock_until));
                active.update(&self.pool).await?;
                log::warn!(
                    "Account {} locked until {} after {} failed logins",
                    user.username,
                    lock_until,
                    attempts
                );
                return Err(AppError::AccountLocked { lock_until });
            }

            active.lock_until = Set(None);
            active.update(&self.pool).await?;
            log::warn!("Failed login for {} ({attempts} attempts)", user.username);
            return Err(AppError::InvalidCredentials {
                attempts_left: Some(self.config.max_login_attempts - attempts),
            });
        }

        active.login_attempts = Set(0);
        active.lock_until = Set(None);
        active.last_login = Set(Some(now));
        let user = active.update(&self.pool).await?;

        let token = self
            .jwt_service
            .generate_token(user.id, &user.username, user.role)?;
        log::info!("Admin {} logged in", user.username);

        Ok(AuthResponse {
            token,
            user: user.into(),
        })
    }

    /// Resolves the token holder; missing or deactivated accounts are rejected.
    pub async fn verify(&self, user_id: i64) -> AppResult<UserResponse> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| AppError::AuthError("User not found or inactive".to_string()))?;
        Ok(user.into())
    }

    /// One-time creation of the first administrator.
    pub async fn setup(&self, request: SetupRequest) -> AppResult<UserResponse> {
        let existing_admins = users::Entity::find()
            .filter(users::Column::Role.is_in([UserRole::SuperAdmin, UserRole::Admin]))
            .count(&self.pool)
            .await?;
        if existing_admins > 0 {
            return Err(AppError::AlreadyInitialized);
        }

        let (Some(username), Some(email), Some(password)) = (
            required(request.username),
            required(request.email),
            request.password.filter(|p| !p.is_empty()),
        ) else {
            return Err(AppError::ValidationError(
                "All fields are required".to_string(),
            ));
        };

        let email = normalize_email(&email);
        validate_email(&email)?;
        validate_password(&password)?;

        let user = users::ActiveModel {
            username: Set(username),
            email: Set(email),
            password_hash: Set(hash_password(&password, self.config.bcrypt_cost)?),
            role: Set(UserRole::SuperAdmin),
            is_active: Set(true),
            login_attempts: Set(0),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Initial administrator {} created", user.username);
        Ok(user.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TEST_PASSWORD, create_test_user, setup_test_db};

    fn service(pool: DatabaseConnection) -> AuthService {
        AuthService::new(
            pool,
            JwtService::new("test-secret", 86_400),
            AuthConfig {
                max_login_attempts: 5,
                lock_minutes: 30,
                bcrypt_cost: 4,
            },
        )
    }

    fn login(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
        }
    }

    async fn reload(db: &DatabaseConnection, id: i64) -> users::Model {
        users::Entity::find_by_id(id).one(db).await.unwrap().unwrap()
    }

    #[actix_web::test]
    async fn test_setup_creates_super_admin_once() {
        let db = setup_test_db().await;
        let svc = service(db.clone());

        let request = SetupRequest {
            username: Some("mahant".to_string()),
            email: Some("Mahant@Temple.org".to_string()),
            password: Some("Seva2024Pass".to_string()),
        };
        let user = svc.setup(request.clone()).await.unwrap();
        assert_eq!(user.role, UserRole::SuperAdmin);
        assert_eq!(user.email, "mahant@temple.org");

        let again = svc.setup(request).await;
        assert!(matches!(again, Err(AppError::AlreadyInitialized)));
    }

    #[actix_web::test]
    async fn test_setup_validates_input() {
        let svc = service(setup_test_db().await);
        let missing = svc
            .setup(SetupRequest {
                username: Some("a".to_string()),
                email: None,
                password: Some("Seva2024Pass".to_string()),
            })
            .await;
        assert!(matches!(missing, Err(AppError::ValidationError(_))));

        let weak = svc
            .setup(SetupRequest {
                username: Some("a".to_string()),
                email: Some("a@temple.org".to_string()),
                password: Some("weak".to_string()),
            })
            .await;
        assert!(matches!(weak, Err(AppError::ValidationError(_))));
    }

    #[actix_web::test]
    async fn test_login_by_username_or_email() {
        let db = setup_test_db().await;
        let user = create_test_user(&db, "pujari", UserRole::Admin).await;
        let svc = service(db.clone());

        let by_name = svc.login(login("pujari", TEST_PASSWORD)).await.unwrap();
        assert_eq!(by_name.user.id, user.id);
        assert!(!by_name.token.is_empty());

        let by_email = svc
            .login(login("Pujari@temple.test", TEST_PASSWORD))
            .await
            .unwrap();
        assert_eq!(by_email.user.username, "pujari");
        assert!(reload(&db, user.id).await.last_login.is_some());
    }

    #[actix_web::test]
    async fn test_missing_fields_and_unknown_user() {
        let svc = service(setup_test_db().await);
        let missing = svc
            .login(LoginRequest {
                username: Some("x".to_string()),
                password: None,
            })
            .await;
        assert!(matches!(missing, Err(AppError::ValidationError(_))));

        let unknown = svc.login(login("nobody", TEST_PASSWORD)).await;
        assert!(matches!(
            unknown,
            Err(AppError::InvalidCredentials { attempts_left: None })
        ));
    }

    #[actix_web::test]
    async fn test_five_failures_lock_the_account() {
        let db = setup_test_db().await;
        let user = create_test_user(&db, "pujari", UserRole::Admin).await;
        let svc = service(db.clone());

        for expected_left in [4, 3, 2, 1] {
            let err = svc.login(login("pujari", "wrong")).await.unwrap_err();
            assert!(matches!(
                err,
                AppError::InvalidCredentials { attempts_left: Some(left) } if left == expected_left
            ));
        }

        let fifth = svc.login(login("pujari", "wrong")).await.unwrap_err();
        assert!(matches!(fifth, AppError::AccountLocked { .. }));
        let locked = reload(&db, user.id).await;
        assert_eq!(locked.login_attempts, 5);
        assert!(locked.is_locked_at(Utc::now()));

        // Correct password does not get through while locked.
        let blocked = svc.login(login("pujari", TEST_PASSWORD)).await.unwrap_err();
        assert!(matches!(blocked, AppError::AccountLocked { .. }));
    }

    #[actix_web::test]
    async fn test_success_before_lock_resets_counter() {
        let db = setup_test_db().await;
        let user = create_test_user(&db, "pujari", UserRole::Admin).await;
        let svc = service(db.clone());

        for _ in 0..4 {
            assert!(svc.login(login("pujari", "wrong")).await.is_err());
        }
        svc.login(login("pujari", TEST_PASSWORD)).await.unwrap();
        assert_eq!(reload(&db, user.id).await.login_attempts, 0);

        let err = svc.login(login("pujari", "wrong")).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidCredentials { attempts_left: Some(4) }
        ));
    }

    #[actix_web::test]
    async fn test_expired_lock_starts_fresh() {
        let db = setup_test_db().await;
        let user = create_test_user(&db, "pujari", UserRole::Admin).await;
        let mut active = user.clone().into_active_model();
        active.login_attempts = Set(5);
        active.lock_until = Set(Some(Utc::now() - Duration::minutes(1)));
        active.update(&db).await.unwrap();

        let svc = service(db.clone());
        let err = svc.login(login("pujari", "wrong")).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidCredentials { attempts_left: Some(4) }
        ));
        let after = reload(&db, user.id).await;
        assert_eq!(after.login_attempts, 1);
        assert!(after.lock_until.is_none());
    }

    #[actix_web::test]
    async fn test_verify_rejects_inactive_user() {
        let db = setup_test_db().await;
        let user = create_test_user(&db, "pujari", UserRole::Admin).await;
        let svc = service(db.clone());
        assert_eq!(svc.verify(user.id).await.unwrap().username, "pujari");

        let mut active = user.into_active_model();
        active.is_active = Set(false);
        let user = active.update(&db).await.unwrap();
        assert!(matches!(svc.verify(user.id).await, Err(AppError::AuthError(_))));
        assert!(matches!(svc.verify(9999).await, Err(AppError::AuthError(_))));
    }
}
