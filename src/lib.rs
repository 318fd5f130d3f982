// 录像搜索客户端库
//
// 本库提供录像搜索/浏览控制器的核心功能，包括：
// - URL 查询参数编解码
// - 录像 API 请求
// - 响应解析
// - 搜索状态同步与过期响应过滤
// - 规范 URL 与分页链接生成

pub mod external;
pub mod models;
pub mod services;
