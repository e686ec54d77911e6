//! 成绩登记规则
//!
//! 只有选课记录所属课程的授课教师可以登记成绩，成绩须为 [0, 100] 内的有限数值。

use tracing::{info, warn};

use crate::errors::{CourseDeskError, Result};
use crate::models::enrollments::entities::{Enrollment, EnrollmentDetail};
use crate::storage::Storage;
use crate::utils::validate::parse_grade;

pub const GRADE_DENIED_MESSAGE: &str = "You can only grade students in your own courses.";

/// 备注去除首尾空白，空字符串视为未填写
pub(crate) fn normalize_remark(remark: Option<String>) -> Option<String> {
    remark
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
}

/// 加载选课记录并确认调用者为授课教师
pub(crate) async fn load_owned(
    storage: &dyn Storage,
    teacher_id: i64,
    enrollment_id: i64,
) -> Result<EnrollmentDetail> {
    let detail = storage
        .get_enrollment_by_id(enrollment_id)
        .await?
        .ok_or_else(|| CourseDeskError::not_found("Enrollment not found."))?;

    if detail.teacher_id != teacher_id {
        warn!(
            "Teacher {} attempted to grade enrollment {} of course {} taught by {}",
            teacher_id, enrollment_id, detail.enrollment.course_id, detail.teacher_id
        );
        return Err(CourseDeskError::authorization(GRADE_DENIED_MESSAGE));
    }

    Ok(detail)
}

/// 登记成绩
///
/// 返回 NotFound、Authorization、Validation 或存储错误，失败时不修改数据。
pub(crate) async fn apply_grade(
    storage: &dyn Storage,
    teacher_id: i64,
    enrollment_id: i64,
    grade: &str,
    remark: Option<String>,
) -> Result<Enrollment> {
    load_owned(storage, teacher_id, enrollment_id).await?;

    let grade = parse_grade(grade).map_err(CourseDeskError::validation)?;
    let remark = normalize_remark(remark);

    let enrollment = storage
        .set_grade(enrollment_id, grade, remark)
        .await?
        .ok_or_else(|| CourseDeskError::not_found("Enrollment not found."))?;

    info!(
        "Teacher {} graded enrollment {} with {}",
        teacher_id, enrollment_id, grade
    );
    Ok(enrollment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_remark() {
        assert_eq!(normalize_remark(None), None);
        assert_eq!(normalize_remark(Some("   ".into())), None);
        assert_eq!(
            normalize_remark(Some("  Good work ".into())),
            Some("Good work".to_string())
        );
    }
}
