use std::fmt::Write;

use crate::{processing::ProcessingReport, quality::QualityTier};

/// Horizontal precision (m) required for certification
const CERTIFICATION_THRESHOLD_M: f64 = 0.50;

const RULER_WIDTH: usize = 60;

/// Formats the technical report
pub(crate) fn technical_report(report: &ProcessingReport) -> String {
    // formatting into a String is infallible
    let mut s = String::new();
    let _ = write_report(&mut s, report);
    s
}

fn write_report(s: &mut String, report: &ProcessingReport) -> std::fmt::Result {
    let ruler = "=".repeat(RULER_WIDTH);
    let coords = &report.coordinates;
    let utm = &coords.utm;
    let precision = &report.precision;
    let quality = &report.quality;
    let details = &report.processing_details;

    writeln!(s, "PARECER TÉCNICO - PROCESSAMENTO GEODÉSICO GNSS")?;
    writeln!(s, "{}", ruler)?;
    writeln!(
        s,
        "Tempo de Processamento: {:.2} segundos",
        details.processing_time.to_seconds()
    )?;
    writeln!(s)?;

    writeln!(s, "COORDENADAS CALCULADAS")?;
    writeln!(s, "Latitude:  {:.8}°", coords.latitude)?;
    writeln!(s, "Longitude: {:.8}°", coords.longitude)?;
    writeln!(s, "Altitude:  {:.3} m", coords.altitude)?;
    writeln!(s)?;

    writeln!(s, "COORDENADAS UTM")?;
    writeln!(s, "Zona: {} {}", utm.zone, utm.hemisphere)?;
    writeln!(s, "E: {:.3} m", utm.easting_m)?;
    writeln!(s, "N: {:.3} m", utm.northing_m)?;
    writeln!(s, "MC: {}°", utm.central_meridian_deg)?;
    writeln!(s)?;

    writeln!(s, "PRECISÃO ALCANÇADA")?;
    writeln!(s, "Horizontal: {:.3} m", precision.horizontal)?;
    writeln!(s, "Vertical:   {:.3} m", precision.vertical)?;
    writeln!(s, "PDOP: {:.1}", precision.pdop)?;
    writeln!(s, "HDOP: {:.1}", precision.hdop)?;
    writeln!(s, "VDOP: {:.1}", precision.vdop)?;
    writeln!(
        s,
        "Intervalo de Confiança (95%): ±{:.3} m",
        precision.confidence_95
    )?;
    writeln!(s)?;

    writeln!(s, "QUALIDADE DO PROCESSAMENTO")?;
    writeln!(s, "Classificação: {}", quality.classification)?;
    writeln!(s, "Satélites Utilizados: {}", quality.satellites_used)?;
    writeln!(s, "Épocas Processadas: {}", quality.epochs_processed)?;
    writeln!(
        s,
        "Tempo de Observação: {:.2} horas",
        quality.observation_hours
    )?;
    writeln!(s, "Taxa de Fixação: {:.1}%", f64::from(quality.fix_rate))?;
    writeln!(s, "Status INCRA: {}", report.verdict())?;
    writeln!(s)?;

    writeln!(s, "DETALHES TÉCNICOS")?;
    writeln!(s, "Método: {}", details.method)?;
    writeln!(s, "Datum: {}", details.datum)?;
    writeln!(
        s,
        "Correções Aplicadas: {}",
        details.corrections_applied.join(", ")
    )?;
    writeln!(s, "Modo de Precisão: {}", details.precision_mode)?;
    writeln!(s)?;

    writeln!(s, "COORDENADAS CARTESIANAS (ECEF)")?;
    writeln!(s, "X: {:.3} m", report.cartesian.x)?;
    writeln!(s, "Y: {:.3} m", report.cartesian.y)?;
    writeln!(s, "Z: {:.3} m", report.cartesian.z)?;
    writeln!(s)?;

    writeln!(s, "PARECER PARA GEORREFERENCIAMENTO")?;
    writeln!(s, "{}", ruler)?;

    let certified = matches!(
        quality.classification,
        QualityTier::Excellent | QualityTier::Good
    ) && precision.horizontal < CERTIFICATION_THRESHOLD_M;

    if certified {
        writeln!(s, "DADOS ADEQUADOS PARA CERTIFICAÇÃO INCRA/SIGEF")?;
        writeln!(
            s,
            "Precisão atende norma técnica (< {:.2}m)",
            CERTIFICATION_THRESHOLD_M
        )?;
        writeln!(s, "Qualidade dos dados: APROVADA")?;
        writeln!(s, "Recomenda-se prosseguir com certificação")?;
    } else {
        writeln!(s, "DADOS NECESSITAM REVISÃO")?;
        writeln!(
            s,
            "Precisão fora do limite INCRA (> {:.2}m)",
            CERTIFICATION_THRESHOLD_M
        )?;
        writeln!(s, "Recomenda-se nova coleta de dados")?;
        writeln!(s, "Verificar obstruções e tempo de observação")?;
    }

    Ok(())
}
