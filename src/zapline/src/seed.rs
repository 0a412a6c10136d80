//! Demo campaign seeding. Authors one campaign through the real editor
//! session so the workflow path is exercised end-to-end at startup.

use anyhow::Context;
use tracing::info;

use zapline_campaigns::CampaignStore;
use zapline_directory::DirectoryStore;
use zapline_workflow::{
    Cadence, CampaignObjective, MediaSource, StepKind, WorkflowEditorSession,
};

pub async fn seed_demo_campaign(
    directory: &DirectoryStore,
    campaigns: &CampaignStore,
) -> anyhow::Result<()> {
    let mut session = WorkflowEditorSession::new();

    session.open_new_step(StepKind::Text);
    session
        .form_mut()
        .context("new-step form should be open")?
        .content = "Olá {nome}! Nossa promoção de boas-vindas começou.".to_string();
    session
        .confirm_form()
        .context("seed greeting step should validate")?;

    session.open_new_step(StepKind::Image);
    {
        let form = session.form_mut().context("new-step form should be open")?;
        form.content = "Confira os destaques da semana".to_string();
        form.media = Some(MediaSource::Url {
            url: "https://cdn.zapline.app/demo/destaques.png".to_string(),
        });
    }
    session
        .confirm_form()
        .context("seed image step should validate")?;

    let audience: Vec<_> = directory
        .list_contacts(None)
        .iter()
        .map(|c| c.id)
        .collect();
    session.set_audience(audience);
    session.set_name("Campanha de Boas-Vindas");
    session.set_objective(CampaignObjective::Prospecting);
    session.set_cadence(Cadence {
        min_delay_secs: 5,
        max_delay_secs: 12,
    });

    let submission = session
        .begin_submission()
        .context("seed campaign should assemble")?;
    let campaign = campaigns.submit(submission).await?;
    session.finish_submission(true);

    info!(campaign_id = %campaign.id, name = %campaign.name, "Demo campaign seeded");
    Ok(())
}
