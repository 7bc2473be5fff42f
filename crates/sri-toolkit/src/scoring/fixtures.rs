use crate::reference::ReferenceCatalog;

pub(crate) const LEVEL_HEADER: &str =
    "code,domain,level,score_cr1,score_cr2,score_cr3,score_cr4,score_cr5,score_cr6,score_cr7,mandatory\n";
pub(crate) const WEIGHT_HEADER: &str =
    "building_type,zone,domain,dw_cr1,dw_cr2,dw_cr3,dw_cr4,dw_cr5,dw_cr6,dw_cr7\n";
pub(crate) const SERVICE_HEADER: &str = "code,domain,group,service\n";

pub(crate) const HEATING_LEVELS: &str = "H1,Heating,0,0,0,0,0,0,0,0,true\n\
H1,Heating,1,1,0,1,1,0,0,0,false\n\
H1,Heating,2,2,1,2,1,0,1,1,false\n\
H1,Heating,3,3,2,2,2,0,2,2,false\n";

pub(crate) const OFFICE_WEIGHTS: &str = "Office,Temperate,Heating,0.2,0.2,0.2,0.2,0.2,0.2,0.2\n\
Office,Temperate,Lighting,0.1,0.1,0.1,0.1,0.1,0.1,0.1\n";

fn catalog(levels: &str, weights: &str, services: &str) -> ReferenceCatalog {
    ReferenceCatalog::from_readers(
        format!("{LEVEL_HEADER}{levels}").as_bytes(),
        format!("{WEIGHT_HEADER}{weights}").as_bytes(),
        format!("{SERVICE_HEADER}{services}").as_bytes(),
    )
    .expect("fixture catalog is valid")
}

/// One heating service `H1` with levels 0-3, weighted for Office/Temperate.
pub(crate) fn heating_catalog() -> ReferenceCatalog {
    catalog(
        HEATING_LEVELS,
        OFFICE_WEIGHTS,
        "H1,Heating,Heat emission control,Heat emission control\n",
    )
}

/// `H1` alongside a second heating service `H2` with levels 0-1.
pub(crate) fn two_service_catalog() -> ReferenceCatalog {
    let levels = format!(
        "{HEATING_LEVELS}H2,Heating,0,0,0,0,0,0,0,0,true\nH2,Heating,1,5,0,0,0,0,0,1,false\n"
    );
    catalog(
        &levels,
        OFFICE_WEIGHTS,
        "H1,Heating,Heat emission control,Heat emission control\n\
H2,Heating,Heat generation,Heat generator control\n",
    )
}

/// `H1` levels 2 and 3 with energy-efficiency scores 10 and 20.
pub(crate) fn interpolation_catalog() -> ReferenceCatalog {
    catalog(
        "H1,Heating,2,10,0,0,0,0,0,0,false\nH1,Heating,3,20,0,0,0,0,0,0,false\n",
        OFFICE_WEIGHTS,
        "",
    )
}
