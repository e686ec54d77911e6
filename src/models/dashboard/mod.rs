use serde::Serialize;

/// 仪表盘统计，不适用的项为 None
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardCounts {
    pub course_count: Option<u64>,
    pub student_count: Option<u64>,
    pub teacher_count: Option<u64>,
}
