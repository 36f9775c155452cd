pub mod form_panel;
pub mod history_list;
pub mod lesson_view;
pub mod topic_field;
