use folio_core_health_impl::HealthFeatureServiceImpl;
use folio_core_relay_impl::RelayFeatureServiceImpl;
use folio_email_impl::EmailServiceImpl;
use folio_shared_impl::time::TimeServiceImpl;
use folio_templates_impl::TemplateServiceImpl;

// API
pub type RestServer = folio_api_rest::RestServer<HealthFeature, RelayFeature>;

// Email
pub type Email = EmailServiceImpl;

// Shared
pub type Time = TimeServiceImpl;

// Templates
pub type Template = TemplateServiceImpl;

// Core
pub type HealthFeature = HealthFeatureServiceImpl<Time, Email>;
pub type RelayFeature = RelayFeatureServiceImpl<Email, Template>;
