/// 路由器：维护当前可见的地址
pub trait Router {
    /// 替换当前地址的查询部分，不增加历史记录
    fn replace(&mut self, url_suffix: &str);

    /// 由相对路径构造完整链接
    fn href(&self, path: &str) -> String;
}

/// 内存路由器
///
/// 记录当前地址和替换次数，供命令行和测试使用。
#[derive(Debug, Clone)]
pub struct MemoryRouter {
    base: String,
    location: String,
    replace_count: usize,
}

impl MemoryRouter {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            location: String::new(),
            replace_count: 0,
        }
    }

    /// 当前地址的查询部分
    pub fn location(&self) -> &str {
        &self.location
    }

    /// 当前地址的完整链接
    pub fn current_href(&self) -> String {
        self.href(&self.location)
    }

    pub fn replace_count(&self) -> usize {
        self.replace_count
    }
}

impl Router for MemoryRouter {
    fn replace(&mut self, url_suffix: &str) {
        self.location = url_suffix.to_string();
        self.replace_count += 1;
    }

    fn href(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
