use std::collections::BTreeMap;

use core_types::UiLanguage;

#[derive(Debug, Clone)]
pub struct I18n {
    lang: UiLanguage,
    zh_cn: BTreeMap<&'static str, &'static str>,
    en_us: BTreeMap<&'static str, &'static str>,
}

impl I18n {
    pub fn new(lang: UiLanguage) -> Self {
        Self {
            lang,
            zh_cn: zh_cn_map(),
            en_us: en_us_map(),
        }
    }

    pub fn set_language(&mut self, lang: UiLanguage) {
        self.lang = lang;
    }

    pub fn language(&self) -> UiLanguage {
        self.lang
    }

    pub fn t<'a>(&'a self, key: &'a str) -> &'a str {
        match self.lang {
            UiLanguage::ZhCn => self
                .zh_cn
                .get(key)
                .copied()
                .or_else(|| self.en_us.get(key).copied())
                .unwrap_or(key),
            UiLanguage::EnUs => self
                .en_us
                .get(key)
                .copied()
                .or_else(|| self.zh_cn.get(key).copied())
                .unwrap_or(key),
        }
    }

    /// Translates `key` and substitutes each `{name}` placeholder with its value.
    pub fn format(&self, key: &str, args: &[(&str, &str)]) -> String {
        args.iter()
            .fold(self.t(key).to_string(), |text, (name, value)| {
                text.replace(&format!("{{{name}}}"), value)
            })
    }
}

fn zh_cn_map() -> BTreeMap<&'static str, &'static str> {
    BTreeMap::from([
        ("app.title", "AI Agent 对话系统"),
        ("app.subtitle", "基于阿里千问API的智能对话助手"),
        (
            "chat.greeting",
            "您好！我是您的AI助手。您可以直接与我对话，或者上传PDF文件来构建知识库。我会优先从知识库中寻找答案。",
        ),
        (
            "chat.fallback",
            "抱歉，发生了错误。请检查后端服务是否正常运行，或确认API密钥配置是否正确。",
        ),
        ("chat.thinking", "AI正在思考中..."),
        ("chat.source", "来源"),
        ("chat.source.knowledge_base", "知识库"),
        ("chat.source.external_api", "千问API"),
        ("chat.source_files", "参考文档"),
        ("upload.hint", "点击或拖拽上传PDF文件"),
        ("upload.limits", "支持PDF格式，最大{max_mb}MB"),
        ("upload.only_pdf", "只支持PDF文件上传"),
        ("upload.in_progress", "上传中..."),
        ("upload.success", "文件上传成功：{filename}"),
        ("upload.failed", "上传失败：{error}"),
        ("upload.unknown_error", "未知错误"),
        ("documents.title", "已上传文档 ({count})"),
        ("documents.empty", "暂无文档，请上传PDF文件"),
        ("documents.delete_confirm", "确定要删除这个文档吗？"),
        ("documents.delete_failed", "删除失败"),
        ("documents.refresh_failed", "获取文档列表失败"),
        ("status.healthy", "后端服务正常"),
        ("status.unreachable", "无法连接后端服务"),
    ])
}

fn en_us_map() -> BTreeMap<&'static str, &'static str> {
    BTreeMap::from([
        ("app.title", "AI Agent Chat"),
        ("app.subtitle", "Knowledge-base assistant"),
        (
            "chat.greeting",
            "Hello! I'm your AI assistant. Chat with me directly, or upload PDF files to build a knowledge base. I'll look for answers there first.",
        ),
        (
            "chat.fallback",
            "Sorry, something went wrong. Check that the backend service is running and that its API key is configured correctly.",
        ),
        ("chat.thinking", "Thinking..."),
        ("chat.source", "Source"),
        ("chat.source.knowledge_base", "Knowledge base"),
        ("chat.source.external_api", "General model"),
        ("chat.source_files", "References"),
        ("upload.hint", "Click or drop a PDF file to upload"),
        ("upload.limits", "PDF only, up to {max_mb} MB"),
        ("upload.only_pdf", "Only PDF files can be uploaded"),
        ("upload.in_progress", "Uploading..."),
        ("upload.success", "Uploaded: {filename}"),
        ("upload.failed", "Upload failed: {error}"),
        ("upload.unknown_error", "unknown error"),
        ("documents.title", "Documents ({count})"),
        ("documents.empty", "No documents yet. Upload a PDF to get started."),
        ("documents.delete_confirm", "Delete this document?"),
        ("documents.delete_failed", "Delete failed"),
        ("documents.refresh_failed", "Could not load the document list"),
        ("status.healthy", "Backend is healthy"),
        ("status.unreachable", "Backend is unreachable"),
    ])
}
