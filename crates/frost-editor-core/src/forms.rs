//! Validation behind the link, image and video insert forms.
//!
//! The rendering layer builds the dialogs; this module turns their field
//! values into content or a [`FormError`] to show next to the field.

use std::sync::LazyLock;

use regex::Regex;

use crate::dom::DomNode;
use crate::error::FormError;

static YOUTUBE_WATCH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)youtube\.com/watch\?v=(\w+)").expect("YOUTUBE_WATCH: hardcoded regex is valid")
});

/// An embeddable video parsed from a page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoEmbed {
    pub id: String,
}

impl VideoEmbed {
    pub fn parse(url: &str) -> Result<Self, FormError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(FormError::EmptyUrl);
        }
        YOUTUBE_WATCH
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|id| Self {
                id: id.as_str().to_string(),
            })
            .ok_or_else(|| FormError::InvalidVideoUrl(url.to_string()))
    }

    pub fn to_html(&self) -> String {
        format!(
            r#"<iframe width="560" height="315" src="https://www.youtube.com/embed/{}" frameborder="0" allowfullscreen></iframe>"#,
            self.id
        )
    }
}

/// Field values of the link form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkForm {
    pub text: String,
    pub href: String,
    pub new_window: bool,
}

impl LinkForm {
    /// Prefill from an existing anchor.
    pub fn from_link<N: DomNode>(link: &N) -> Self {
        Self {
            text: link.text_content(),
            href: link.get_attribute("href").unwrap_or_default(),
            new_window: link.get_attribute("target").as_deref() == Some("_blank"),
        }
    }

    /// Trimmed href, with the text falling back to it.
    pub fn validate(mut self) -> Result<Self, FormError> {
        self.href = self.href.trim().to_string();
        if self.href.is_empty() {
            return Err(FormError::EmptyUrl);
        }
        if self.text.trim().is_empty() {
            self.text = self.href.clone();
        }
        Ok(self)
    }

    /// Build the anchor in the document `doc` belongs to.
    pub fn to_element<N: DomNode>(&self, doc: &N) -> N {
        let link = doc.create_element("a");
        link.set_attribute("href", &self.href);
        if self.new_window {
            link.set_attribute("target", "_blank");
        }
        link.append_child(&doc.create_text(&self.text));
        link
    }

    /// Write the fields back onto an existing anchor.
    pub fn apply_to<N: DomNode>(&self, link: &N) {
        link.set_attribute("href", &self.href);
        if self.new_window {
            link.set_attribute("target", "_blank");
        } else {
            link.remove_attribute("target");
        }
        if link.text_content() != self.text {
            while let Some(child) = link.first_child() {
                child.detach();
            }
            link.append_child(&link.create_text(&self.text));
        }
    }
}

/// Validate an image URL from the image form.
pub fn image_src(url: &str) -> Result<String, FormError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(FormError::EmptyUrl);
    }
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessDocument;

    #[test]
    fn youtube_urls() {
        let embed = VideoEmbed::parse("https://www.YouTube.com/watch?v=dQw4w9WgXcQ&t=1").unwrap();
        assert_eq!(embed.id, "dQw4w9WgXcQ");
        insta::assert_snapshot!(
            embed.to_html(),
            @r#"<iframe width="560" height="315" src="https://www.youtube.com/embed/dQw4w9WgXcQ" frameborder="0" allowfullscreen></iframe>"#
        );
        assert_eq!(
            VideoEmbed::parse("https://vimeo.com/1"),
            Err(FormError::InvalidVideoUrl("https://vimeo.com/1".into()))
        );
        assert_eq!(VideoEmbed::parse("  "), Err(FormError::EmptyUrl));
    }

    #[test]
    fn link_form_validation() {
        let form = LinkForm {
            text: " ".into(),
            href: " https://example.com ".into(),
            new_window: true,
        }
        .validate()
        .unwrap();
        assert_eq!(form.text, "https://example.com");
        assert_eq!(
            LinkForm::default().validate(),
            Err(FormError::EmptyUrl)
        );

        let root = HeadlessDocument::parse("");
        root.append_child(&form.to_element(&root));
        assert_eq!(
            root.inner_html(),
            r#"<a href="https://example.com" target="_blank">https://example.com</a>"#
        );
    }

    #[test]
    fn prefill_and_apply() {
        let root = HeadlessDocument::parse(r#"<a href="/a" target="_blank">old</a>"#);
        let link = root.first_child().unwrap();
        let mut form = LinkForm::from_link(&link);
        assert_eq!(
            form,
            LinkForm {
                text: "old".into(),
                href: "/a".into(),
                new_window: true
            }
        );
        form.new_window = false;
        form.text = "new".into();
        form.apply_to(&link);
        assert_eq!(root.inner_html(), r#"<a href="/a">new</a>"#);
    }

    #[test]
    fn image_urls() {
        assert_eq!(image_src(" a.png "), Ok("a.png".to_string()));
        assert_eq!(image_src(""), Err(FormError::EmptyUrl));
    }
}
