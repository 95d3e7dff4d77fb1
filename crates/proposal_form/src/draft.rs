use client_core::AttachmentUpload;

/// Label shown by the file picker when nothing is attached.
pub const NO_FILES_LABEL: &str = "Choose files";

/// Proposal data the user is still editing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProposalDraft {
    pub title: String,
    pub content_html: String,
    attached_files: Vec<AttachmentUpload>,
}

impl ProposalDraft {
    pub fn attached_files(&self) -> &[AttachmentUpload] {
        &self.attached_files
    }

    pub fn add_files(&mut self, files: impl IntoIterator<Item = AttachmentUpload>) {
        self.attached_files.extend(files);
    }

    /// Removes the file at `index`. Out-of-range indexes are ignored.
    pub fn remove_file(&mut self, index: usize) -> Option<AttachmentUpload> {
        if index < self.attached_files.len() {
            Some(self.attached_files.remove(index))
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        self.title.clear();
        self.content_html.clear();
        self.attached_files.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.content_html.is_empty() && self.attached_files.is_empty()
    }

    /// File picker label, derived from the current attachments.
    pub fn selected_file_names(&self) -> String {
        if self.attached_files.is_empty() {
            return NO_FILES_LABEL.to_string();
        }
        self.attached_files
            .iter()
            .map(|file| file.filename.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> AttachmentUpload {
        AttachmentUpload::new(name, name.as_bytes().to_vec())
    }

    fn names(draft: &ProposalDraft) -> Vec<&str> {
        draft
            .attached_files()
            .iter()
            .map(|file| file.filename.as_str())
            .collect()
    }

    #[test]
    fn empty_draft_shows_placeholder_label() {
        let draft = ProposalDraft::default();
        assert_eq!(draft.selected_file_names(), "Choose files");
        assert!(draft.is_empty());
    }

    #[test]
    fn appended_files_keep_order_across_batches() {
        let mut draft = ProposalDraft::default();
        draft.add_files([file("agenda.pdf"), file("poster.png")]);
        draft.add_files([file("budget.xlsx")]);

        assert_eq!(
            draft.selected_file_names(),
            "agenda.pdf, poster.png, budget.xlsx"
        );
    }

    #[test]
    fn remove_file_drops_only_that_position() {
        let mut draft = ProposalDraft::default();
        draft.add_files([file("a.pdf"), file("b.pdf"), file("c.pdf"), file("d.pdf")]);

        let removed = draft.remove_file(1).expect("in range");
        assert_eq!(removed.filename, "b.pdf");
        assert_eq!(names(&draft), vec!["a.pdf", "c.pdf", "d.pdf"]);
        assert_eq!(draft.selected_file_names(), "a.pdf, c.pdf, d.pdf");
    }

    #[test]
    fn remove_out_of_range_is_a_no_op() {
        let mut draft = ProposalDraft::default();
        draft.add_files([file("a.pdf")]);

        assert!(draft.remove_file(5).is_none());
        assert_eq!(names(&draft), vec!["a.pdf"]);
    }

    #[test]
    fn removing_last_file_restores_placeholder() {
        let mut draft = ProposalDraft::default();
        draft.add_files([file("a.pdf")]);
        draft.remove_file(0);
        assert_eq!(draft.selected_file_names(), NO_FILES_LABEL);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut draft = ProposalDraft {
            title: "Hackathon".to_string(),
            content_html: "<p>48 hours</p>".to_string(),
            ..ProposalDraft::default()
        };
        draft.add_files([file("rules.pdf")]);

        draft.reset();
        let once = draft.clone();
        draft.reset();

        assert_eq!(draft, once);
        assert_eq!(draft, ProposalDraft::default());
    }
}
