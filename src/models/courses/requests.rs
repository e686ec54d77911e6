use serde::Deserialize;

// 创建课程表单，teacher_id 由服务层解析以便回显校验提示
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCourseForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub teacher_id: String,
}

// 修改课程名称表单
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCourseForm {
    #[serde(default)]
    pub course_id: String,
    #[serde(default)]
    pub name: String,
}
