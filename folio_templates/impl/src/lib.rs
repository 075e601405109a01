use std::sync::Arc;

use folio_di::Build;
use folio_templates_contracts::{Template, TemplateService, BASE_TEMPLATE, TEMPLATES};
use tera::Tera;

#[derive(Debug, Clone, Default, Build)]
pub struct TemplateServiceImpl {
    #[state]
    state: State,
}

#[derive(Debug, Clone)]
struct State(Arc<Tera>);

impl Default for State {
    fn default() -> Self {
        let mut tera = Tera::default();

        let (base_name, base) = BASE_TEMPLATE;
        tera.add_raw_template(base_name, base)
            .expect("base template must parse");

        tera.add_raw_templates(TEMPLATES.iter().copied())
            .expect("email templates must parse");

        Self(tera.into())
    }
}

impl TemplateService for TemplateServiceImpl {
    fn render<T: Template>(&self, template: &T) -> anyhow::Result<String> {
        let context = tera::Context::from_serialize(template)?;
        self.state.0.render(T::NAME, &context).map_err(Into::into)
    }
}
