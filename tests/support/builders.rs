// tests/support/builders.rs
use folio_core::application::commands::{
    articles::{ArticleTransition, ChangeArticleStatusCommand, CreateArticleCommand},
    comments::SubmitCommentCommand,
    projects::CreateProjectCommand,
    tags::CreateTagCommand,
};
use folio_core::domain::project::ProjectDetails;
use uuid::Uuid;

pub fn draft(title: &str) -> CreateArticleCommand {
    CreateArticleCommand::builder()
        .title(title)
        .content(format!("Body of {title}"))
        .build()
        .expect("title and content are set")
}

pub fn published(title: &str, tags: &[&str]) -> CreateArticleCommand {
    let mut builder = CreateArticleCommand::builder()
        .title(title)
        .content(format!("Body of {title}"))
        .summary(format!("About {title}"))
        .publish(true);
    for tag in tags {
        builder = builder.tag(*tag);
    }
    builder.build().expect("title and content are set")
}

pub fn transition(id: Uuid, transition: ArticleTransition) -> ChangeArticleStatusCommand {
    ChangeArticleStatusCommand {
        id,
        version: None,
        transition,
    }
}

pub fn comment_on(article_id: Uuid, content: &str) -> SubmitCommentCommand {
    SubmitCommentCommand {
        article_id,
        author_name: "Ada".into(),
        author_email: "ada@example.com".into(),
        content: content.into(),
        ip_address: Some("192.0.2.10".into()),
        user_agent: None,
    }
}

pub fn new_tag(name: &str) -> CreateTagCommand {
    CreateTagCommand {
        name: name.into(),
        description: None,
    }
}

pub fn project(title: &str, display_order: i32, is_active: bool) -> CreateProjectCommand {
    CreateProjectCommand {
        details: ProjectDetails {
            title: title.into(),
            description: format!("{title} description"),
            tech_stack: "Rust".into(),
            display_order,
            is_active,
            ..ProjectDetails::default()
        },
    }
}
