use actix_web::{
    HttpRequest, HttpResponse, Result as ActixResult,
    http::header::{self, DispositionType, Range},
};

use super::{VideoService, authorize_class};
use crate::errors::LessonHubError;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::lessons::file_disposition;

/// `Range` 请求头解析结果
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ByteWindow {
    /// 返回完整内容
    Full,
    /// 闭区间 `[start, end]`
    Partial(u64, u64),
    Unsatisfiable,
}

/// 只处理第一个字节区间；无法解析或非 bytes 单位时返回完整内容
pub(crate) fn resolve_range(range_header: Option<&str>, total: u64) -> ByteWindow {
    let Some(raw) = range_header else {
        return ByteWindow::Full;
    };
    match raw.parse::<Range>() {
        Ok(Range::Bytes(specs)) => match specs.first().map(|spec| spec.to_satisfiable_range(total)) {
            Some(Some((start, end))) => ByteWindow::Partial(start, end),
            Some(None) => ByteWindow::Unsatisfiable,
            None => ByteWindow::Full,
        },
        _ => ByteWindow::Full,
    }
}

pub async fn stream_video(
    service: &VideoService,
    request: &HttpRequest,
    class_group: i32,
    id: &str,
) -> ActixResult<HttpResponse> {
    if let Err(response) = authorize_class(service, request, class_group, "stream_video").await {
        return Ok(response);
    }

    let lesson = match service.get_storage(request).get_lesson_by_id(id).await {
        Ok(Some(lesson)) if lesson.class_group == class_group && lesson.is_video() => lesson,
        Ok(_) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::LessonNotFound,
                "Không tìm thấy video",
            )));
        }
        Err(e) => {
            tracing::error!("查询视频 {id} 失败: {e}");
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Không thể tải video",
                )),
            );
        }
    };

    let bytes = match service
        .get_object_store(request)
        .get(&lesson.storage_key)
        .await
    {
        Ok(bytes) => bytes,
        Err(LessonHubError::NotFound(_)) => {
            tracing::warn!("视频 {} 的对象丢失: {}", lesson.id, lesson.storage_key);
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::FileNotFound,
                "File không tồn tại",
            )));
        }
        Err(e) => {
            tracing::error!("读取对象 {} 失败: {e}", lesson.storage_key);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Không thể tải video",
                )),
            );
        }
    };

    let total = bytes.len() as u64;
    let range_header = request
        .headers()
        .get(header::RANGE)
        .and_then(|h| h.to_str().ok());

    match resolve_range(range_header, total) {
        ByteWindow::Full => Ok(HttpResponse::Ok()
            .content_type(lesson.mime_type.as_str())
            .insert_header((header::ACCEPT_RANGES, "bytes"))
            .insert_header((
                header::CONTENT_DISPOSITION,
                file_disposition(DispositionType::Inline, &lesson.original_file_name),
            ))
            .body(bytes)),
        ByteWindow::Partial(start, end) => {
            let body = bytes[start as usize..=end as usize].to_vec();
            Ok(HttpResponse::PartialContent()
                .content_type(lesson.mime_type.as_str())
                .insert_header((header::ACCEPT_RANGES, "bytes"))
                .insert_header((
                    header::CONTENT_RANGE,
                    format!("bytes {start}-{end}/{total}"),
                ))
                .body(body))
        }
        ByteWindow::Unsatisfiable => Ok(HttpResponse::RangeNotSatisfiable()
            .insert_header((header::CONTENT_RANGE, format!("bytes */{total}")))
            .finish()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_range() {
        assert_eq!(resolve_range(None, 100), ByteWindow::Full);
        assert_eq!(resolve_range(Some("bytes=0-9"), 100), ByteWindow::Partial(0, 9));
        assert_eq!(resolve_range(Some("bytes=90-"), 100), ByteWindow::Partial(90, 99));
        assert_eq!(resolve_range(Some("bytes=-10"), 100), ByteWindow::Partial(90, 99));
        assert_eq!(resolve_range(Some("bytes=50-500"), 100), ByteWindow::Partial(50, 99));
        assert_eq!(resolve_range(Some("bytes=200-300"), 100), ByteWindow::Unsatisfiable);
        assert_eq!(resolve_range(Some("garbage"), 100), ByteWindow::Full);
        assert_eq!(resolve_range(Some("items=1-2"), 100), ByteWindow::Full);
    }
}
