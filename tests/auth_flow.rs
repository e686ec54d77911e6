//! 登录、注册与访问控制

#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;

use common::{PASSWORD, get, location, login_request, post_form, session_cookie, setup};
use coursedesk::models::users::entities::RoleName;

#[actix_web::test]
async fn test_unauthenticated_access_redirects_to_login() {
    let ctx = setup().await;
    let app = test_app!(ctx);

    let req = test::TestRequest::get().uri("/courses").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/login?next=/courses");
}

#[actix_web::test]
async fn test_login_page_renders() {
    let ctx = setup().await;
    let app = test_app!(ctx);

    let req = test::TestRequest::get()
        .uri("/login?next=/courses/1")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains(r#"name="next" value="/courses/1""#));
}

#[actix_web::test]
async fn test_login_with_wrong_password_is_rejected() {
    let ctx = setup().await;
    ctx.create_user("student@example.com", RoleName::Student)
        .await;
    let app = test_app!(ctx);

    let req = login_request("student@example.com", "WrongPass99").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("Invalid email or password."));
}

#[actix_web::test]
async fn test_login_follows_local_next_only() {
    let ctx = setup().await;
    ctx.create_user("student@example.com", RoleName::Student)
        .await;
    let app = test_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/login")
        .peer_addr(common::next_peer())
        .set_form([
            ("email", "Student@Example.com"),
            ("password", PASSWORD),
            ("next", "/courses"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/courses");

    let req = test::TestRequest::post()
        .uri("/login")
        .peer_addr(common::next_peer())
        .set_form([
            ("email", "student@example.com"),
            ("password", PASSWORD),
            ("next", "//evil.example.com/"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/");
}

#[actix_web::test]
async fn test_wrong_role_redirects_home_with_notice() {
    let ctx = setup().await;
    ctx.create_user("student@example.com", RoleName::Student)
        .await;
    let app = test_app!(ctx);
    let cookie = login!(app, "student@example.com");

    let resp = test::call_service(&app, get("/create_course", &cookie).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");

    let resp = test::call_service(&app, get("/", &cookie).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("You do not have permission to access that page."));
}

#[actix_web::test]
async fn test_self_registration_creates_student() {
    let ctx = setup().await;
    let app = test_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/register")
        .peer_addr(common::next_peer())
        .set_form([
            ("email", "New.Student@Example.com"),
            ("password", PASSWORD),
            ("password_confirm", PASSWORD),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/login");

    let user = ctx
        .storage
        .get_user_by_email("new.student@example.com")
        .await
        .unwrap()
        .expect("user should exist");
    assert_eq!(user.roles, vec![RoleName::Student]);
}

#[actix_web::test]
async fn test_self_registration_cannot_assign_admin() {
    let ctx = setup().await;
    let app = test_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/register")
        .peer_addr(common::next_peer())
        .set_form([
            ("email", "sneaky@example.com"),
            ("password", PASSWORD),
            ("password_confirm", PASSWORD),
            ("role", "Admin"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("The Admin role cannot be self-assigned."));
    assert!(
        ctx.storage
            .get_user_by_email("sneaky@example.com")
            .await
            .unwrap()
            .is_none()
    );
}

#[actix_web::test]
async fn test_duplicate_email_registration_leaves_users_unchanged() {
    let ctx = setup().await;
    ctx.create_user("admin@example.com", RoleName::Admin).await;
    ctx.create_user("taken@example.com", RoleName::Student).await;
    let app = test_app!(ctx);
    let cookie = login!(app, "admin@example.com");

    let before = ctx
        .storage
        .count_users_by_role(RoleName::Teacher)
        .await
        .unwrap();

    let resp = test::call_service(
        &app,
        post_form(
            "/register_user",
            &cookie,
            [
                ("email", "TAKEN@example.com"),
                ("password", PASSWORD),
                ("password_confirm", PASSWORD),
                ("role", "Teacher"),
            ],
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("Email is already registered."));

    let after = ctx
        .storage
        .count_users_by_role(RoleName::Teacher)
        .await
        .unwrap();
    assert_eq!(before, after);
    let existing = ctx
        .storage
        .get_user_by_email("taken@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(existing.roles, vec![RoleName::Student]);
}

#[actix_web::test]
async fn test_admin_registers_teacher() {
    let ctx = setup().await;
    ctx.create_user("admin@example.com", RoleName::Admin).await;
    let app = test_app!(ctx);
    let cookie = login!(app, "admin@example.com");

    let resp = test::call_service(
        &app,
        post_form(
            "/register_user",
            &cookie,
            [
                ("email", "teacher@example.com"),
                ("password", PASSWORD),
                ("password_confirm", PASSWORD),
                ("role", "Teacher"),
            ],
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/register_user");

    let teacher = ctx
        .storage
        .get_user_by_email("teacher@example.com")
        .await
        .unwrap()
        .expect("teacher should exist");
    assert!(teacher.has_role(RoleName::Teacher));
}

#[actix_web::test]
async fn test_logout_ends_session() {
    let ctx = setup().await;
    ctx.create_user("student@example.com", RoleName::Student)
        .await;
    let app = test_app!(ctx);
    let cookie = login!(app, "student@example.com");

    let resp = test::call_service(&app, get("/", &cookie).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/logout")
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/login");
    let fresh = session_cookie(&resp).expect("logout notice lives in a new session");
    assert_ne!(fresh.value(), cookie.value());

    // 旧令牌已失效
    let resp = test::call_service(&app, get("/", &cookie).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert!(location(&resp).starts_with("/login"));
}

#[actix_web::test]
async fn test_repeated_login_attempts_are_throttled_per_address() {
    let ctx = setup().await;
    ctx.create_user("student@example.com", RoleName::Student)
        .await;
    let app = test_app!(ctx);
    let addr: std::net::SocketAddr = "192.0.2.77:40000".parse().unwrap();

    for _ in 0..5 {
        let req = login_request("student@example.com", "WrongPass99")
            .peer_addr(addr)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    let req = login_request("student@example.com", PASSWORD)
        .peer_addr(addr)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = resp
        .headers()
        .get(actix_web::http::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap();
    assert!((1..=60).contains(&retry_after));

    // 其他地址不受影响
    let resp = test::call_service(
        &app,
        login_request("student@example.com", PASSWORD).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
}
