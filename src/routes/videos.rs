use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::PaginationQuery;
use crate::services::VideoService;

// 懒加载的全局 VideoService 实例
static VIDEO_SERVICE: Lazy<VideoService> = Lazy::new(VideoService::new_lazy);

pub async fn list_class_videos(
    request: HttpRequest,
    path: web::Path<i32>,
    query: web::Query<PaginationQuery>,
) -> ActixResult<HttpResponse> {
    VIDEO_SERVICE
        .list_class_videos(&request, path.into_inner(), query.into_inner())
        .await
}

pub async fn stream_video(
    request: HttpRequest,
    path: web::Path<(i32, String)>,
) -> ActixResult<HttpResponse> {
    let (class_group, id) = path.into_inner();
    VIDEO_SERVICE.stream_video(&request, class_group, &id).await
}

// 配置路由
pub fn configure_video_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/classes/{class_group}/videos")
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_class_videos))
            .route("/{id}/stream", web::get().to(stream_video)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::{MemoryObjectStore, ObjectStore};
    use crate::models::lessons::entities::NewLesson;
    use crate::models::users::entities::UserRole;
    use crate::services::audit::EVENT_UNAUTHORIZED_ACCESS;
    use crate::storage::Storage;
    use crate::test_utils::FakeStorage;
    use crate::utils::jwt::JwtUtils;
    use actix_web::{
        App,
        http::{StatusCode, header},
        test,
    };
    use std::sync::Arc;

    fn bearer(user_id: i64, role: UserRole) -> (&'static str, String) {
        let token = JwtUtils::generate_access_token(user_id, role.as_str()).unwrap();
        ("Authorization", format!("Bearer {token}"))
    }

    fn new_lesson(class_group: i32, key: &str, mime_type: &str) -> NewLesson {
        NewLesson {
            teacher_id: 7,
            class_group,
            title: format!("Bài giảng {key}"),
            description: None,
            original_file_name: "Bài giảng 1.mp4".to_string(),
            storage_key: key.to_string(),
            file_size: 32,
            mime_type: mime_type.to_string(),
        }
    }

    struct Fixture {
        fake: Arc<FakeStorage>,
        storage: Arc<dyn Storage>,
        objects: Arc<dyn ObjectStore>,
        video_id: String,
        content: Vec<u8>,
    }

    async fn fixture() -> Fixture {
        let fake = Arc::new(FakeStorage::new());
        fake.insert_user(1, "admin", UserRole::Admin);
        fake.insert_user(7, "gv_007", UserRole::Teacher);
        fake.insert_user(9, "hs_009", UserRole::Student);
        fake.insert_user(10, "hs_010", UserRole::Student);
        fake.set_user_group(9, Some(2));
        fake.set_user_group(10, Some(3));

        let storage: Arc<dyn Storage> = fake.clone();
        let memory = MemoryObjectStore::new();
        let content: Vec<u8> = (0u8..32).collect();

        let video = storage
            .create_lesson(new_lesson(2, "class_2/1_aaaaaa_Bai_giang_1.mp4", "video/mp4"))
            .await
            .unwrap();
        memory
            .put(&video.storage_key, content.clone(), "video/mp4")
            .await
            .unwrap();
        storage
            .create_lesson(new_lesson(2, "class_2/2_bbbbbb_de.pdf", "application/pdf"))
            .await
            .unwrap();
        storage
            .create_lesson(new_lesson(3, "class_3/3_cccccc_Bai_giang.mp4", "video/mp4"))
            .await
            .unwrap();

        Fixture {
            fake,
            storage,
            objects: Arc::new(memory),
            video_id: video.id,
            content,
        }
    }

    #[actix_web::test]
    async fn test_class_catalog_filtered_by_group() {
        let f = fixture().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(f.storage.clone()))
                .app_data(web::Data::new(f.objects.clone()))
                .configure(configure_video_routes),
        )
        .await;

        // 未登录
        let req = test::TestRequest::get()
            .uri("/api/v1/classes/2/videos")
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED
        );

        // 本班学生只看到视频，不包含文档
        let req = test::TestRequest::get()
            .uri("/api/v1/classes/2/videos")
            .insert_header(bearer(9, UserRole::Student))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["pagination"]["total"], 1);
        assert_eq!(body["data"]["items"][0]["id"], f.video_id.as_str());
        assert_eq!(
            body["data"]["items"][0]["stream_url"],
            format!("/api/v1/classes/2/videos/{}/stream", f.video_id)
        );
        assert!(body["data"]["items"][0].get("storage_key").is_none());

        // 其他班级的学生被拒绝并记录审计
        let req = test::TestRequest::get()
            .uri("/api/v1/classes/2/videos")
            .insert_header(bearer(10, UserRole::Student))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(f.fake.audit_actions(), vec![EVENT_UNAUTHORIZED_ACCESS]);

        // 未分班的教师同样无权查看
        let req = test::TestRequest::get()
            .uri("/api/v1/classes/2/videos")
            .insert_header(bearer(7, UserRole::Teacher))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::FORBIDDEN
        );

        // 管理员可以查看任意班级
        let req = test::TestRequest::get()
            .uri("/api/v1/classes/3/videos")
            .insert_header(bearer(1, UserRole::Admin))
            .to_request();
        let body: serde_json::Value =
            test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["data"]["pagination"]["total"], 1);
    }

    #[actix_web::test]
    async fn test_stream_video_with_range() {
        let f = fixture().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(f.storage.clone()))
                .app_data(web::Data::new(f.objects.clone()))
                .configure(configure_video_routes),
        )
        .await;
        let uri = format!("/api/v1/classes/2/videos/{}/stream", f.video_id);

        // 完整内容
        let req = test::TestRequest::get()
            .uri(&uri)
            .insert_header(bearer(9, UserRole::Student))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "video/mp4");
        assert_eq!(resp.headers().get(header::ACCEPT_RANGES).unwrap(), "bytes");
        let disposition = resp
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("inline"), "{disposition}");
        assert_eq!(test::read_body(resp).await.as_ref(), f.content.as_slice());

        // 区间请求
        let req = test::TestRequest::get()
            .uri(&uri)
            .insert_header(bearer(9, UserRole::Student))
            .insert_header((header::RANGE, "bytes=4-7"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(
            resp.headers().get(header::CONTENT_RANGE).unwrap(),
            "bytes 4-7/32"
        );
        assert_eq!(test::read_body(resp).await.as_ref(), &[4u8, 5, 6, 7]);

        // 超出范围
        let req = test::TestRequest::get()
            .uri(&uri)
            .insert_header(bearer(9, UserRole::Student))
            .insert_header((header::RANGE, "bytes=100-"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(resp.headers().get(header::CONTENT_RANGE).unwrap(), "bytes */32");

        // 班级路径与视频不符时视为不存在
        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/classes/3/videos/{}/stream", f.video_id))
            .insert_header(bearer(1, UserRole::Admin))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NOT_FOUND
        );

        // 其他班级的学生无权播放
        let req = test::TestRequest::get()
            .uri(&uri)
            .insert_header(bearer(10, UserRole::Student))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::FORBIDDEN
        );
    }
}
